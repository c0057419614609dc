//! Content repository: FAQ entries, legal pages, email templates.
//!
//! These are the marketing/content documents edited from the admin
//! back-office and read by the storefront and the notification engine.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use frantoio_core::types::{EmailTemplate, Faq, LegalPage};

#[derive(Debug, Clone, sqlx::FromRow)]
struct FaqRecord {
    id: String,
    question: String,
    answer: String,
    position: i64,
    is_published: bool,
    updated_at: DateTime<Utc>,
}

impl From<FaqRecord> for Faq {
    fn from(r: FaqRecord) -> Self {
        Faq {
            id: r.id,
            question: r.question,
            answer: r.answer,
            position: r.position,
            is_published: r.is_published,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct LegalPageRecord {
    id: String,
    slug: String,
    title: String,
    body_html: String,
    updated_at: DateTime<Utc>,
}

impl From<LegalPageRecord> for LegalPage {
    fn from(r: LegalPageRecord) -> Self {
        LegalPage {
            id: r.id,
            slug: r.slug,
            title: r.title,
            body_html: r.body_html,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct EmailTemplateRecord {
    id: String,
    key: String,
    subject: String,
    body_html: String,
    updated_at: DateTime<Utc>,
}

impl From<EmailTemplateRecord> for EmailTemplate {
    fn from(r: EmailTemplateRecord) -> Self {
        EmailTemplate {
            id: r.id,
            key: r.key,
            subject: r.subject,
            body_html: r.body_html,
            updated_at: r.updated_at,
        }
    }
}

/// Repository for content documents.
#[derive(Debug, Clone)]
pub struct ContentRepository {
    pool: SqlitePool,
}

impl ContentRepository {
    /// Creates a new ContentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ContentRepository { pool }
    }

    // =========================================================================
    // FAQ
    // =========================================================================

    /// Lists published FAQ entries in display order (storefront).
    pub async fn list_published_faqs(&self) -> DbResult<Vec<Faq>> {
        let records = sqlx::query_as::<_, FaqRecord>(
            r#"
            SELECT id, question, answer, position, is_published, updated_at
            FROM faqs
            WHERE is_published = 1
            ORDER BY position, question
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Faq::from).collect())
    }

    /// Lists every FAQ entry (admin).
    pub async fn list_all_faqs(&self) -> DbResult<Vec<Faq>> {
        let records = sqlx::query_as::<_, FaqRecord>(
            r#"
            SELECT id, question, answer, position, is_published, updated_at
            FROM faqs
            ORDER BY position, question
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Faq::from).collect())
    }

    /// Inserts a FAQ entry.
    pub async fn insert_faq(&self, faq: &Faq) -> DbResult<()> {
        debug!(id = %faq.id, "Inserting FAQ");

        sqlx::query(
            r#"
            INSERT INTO faqs (id, question, answer, position, is_published, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&faq.id)
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(faq.position)
        .bind(faq.is_published)
        .bind(faq.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a FAQ entry. Refreshes `updated_at`.
    pub async fn update_faq(&self, faq: &Faq) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE faqs
            SET question = ?2, answer = ?3, position = ?4, is_published = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&faq.id)
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(faq.position)
        .bind(faq.is_published)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Faq", &faq.id));
        }

        Ok(())
    }

    /// Deletes a FAQ entry.
    pub async fn delete_faq(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Faq", id));
        }

        Ok(())
    }

    // =========================================================================
    // Legal pages
    // =========================================================================

    /// Gets a legal page by slug (storefront).
    pub async fn get_page_by_slug(&self, slug: &str) -> DbResult<Option<LegalPage>> {
        let record = sqlx::query_as::<_, LegalPageRecord>(
            "SELECT id, slug, title, body_html, updated_at FROM legal_pages WHERE slug = ?1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(LegalPage::from))
    }

    /// Lists all legal pages (admin).
    pub async fn list_pages(&self) -> DbResult<Vec<LegalPage>> {
        let records = sqlx::query_as::<_, LegalPageRecord>(
            "SELECT id, slug, title, body_html, updated_at FROM legal_pages ORDER BY slug",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(LegalPage::from).collect())
    }

    /// Creates or replaces a legal page, keyed by slug.
    pub async fn upsert_page(&self, slug: &str, title: &str, body_html: &str) -> DbResult<LegalPage> {
        debug!(slug = %slug, "Upserting legal page");

        let now = Utc::now();
        let id = generate_id();

        sqlx::query(
            r#"
            INSERT INTO legal_pages (id, slug, title, body_html, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(slug) DO UPDATE SET
                title = excluded.title,
                body_html = excluded.body_html,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(slug)
        .bind(title)
        .bind(body_html)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_page_by_slug(slug)
            .await?
            .ok_or_else(|| DbError::not_found("LegalPage", slug))
    }

    // =========================================================================
    // Email templates
    // =========================================================================

    /// Gets an email template by key (notification engine).
    pub async fn get_template_by_key(&self, key: &str) -> DbResult<Option<EmailTemplate>> {
        let record = sqlx::query_as::<_, EmailTemplateRecord>(
            "SELECT id, key, subject, body_html, updated_at FROM email_templates WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(EmailTemplate::from))
    }

    /// Lists all email templates (admin).
    pub async fn list_templates(&self) -> DbResult<Vec<EmailTemplate>> {
        let records = sqlx::query_as::<_, EmailTemplateRecord>(
            "SELECT id, key, subject, body_html, updated_at FROM email_templates ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(EmailTemplate::from).collect())
    }

    /// Creates or replaces an email template, keyed by template key.
    pub async fn upsert_template(
        &self,
        key: &str,
        subject: &str,
        body_html: &str,
    ) -> DbResult<EmailTemplate> {
        debug!(key = %key, "Upserting email template");

        let now = Utc::now();
        let id = generate_id();

        sqlx::query(
            r#"
            INSERT INTO email_templates (id, key, subject, body_html, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(key) DO UPDATE SET
                subject = excluded.subject,
                body_html = excluded.body_html,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(key)
        .bind(subject)
        .bind(body_html)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_template_by_key(key)
            .await?
            .ok_or_else(|| DbError::not_found("EmailTemplate", key))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_faq_publish_filter_and_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.content();

        let now = Utc::now();
        for (question, position, published) in [
            ("Spedite all'estero?", 2, true),
            ("Quanto dura una bottiglia aperta?", 1, true),
            ("Bozza non pubblicata", 0, false),
        ] {
            repo.insert_faq(&Faq {
                id: generate_id(),
                question: question.to_string(),
                answer: "...".to_string(),
                position,
                is_published: published,
                updated_at: now,
            })
            .await
            .unwrap();
        }

        let published = repo.list_published_faqs().await.unwrap();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].question, "Quanto dura una bottiglia aperta?");

        assert_eq!(repo.list_all_faqs().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_page_upsert_replaces_by_slug() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.content();

        let first = repo.upsert_page("privacy", "Privacy", "<p>v1</p>").await.unwrap();
        let second = repo.upsert_page("privacy", "Privacy Policy", "<p>v2</p>").await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.body_html, "<p>v2</p>");
        assert_eq!(repo.list_pages().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_template_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.content();

        repo.upsert_template(
            "order_placed",
            "Ordine {{order_number}} ricevuto",
            "<p>Grazie {{name}}!</p>",
        )
        .await
        .unwrap();

        let template = repo.get_template_by_key("order_placed").await.unwrap().unwrap();
        assert_eq!(
            template.render_subject(&[("order_number", "FR-2026-00001")]),
            "Ordine FR-2026-00001 ricevuto"
        );
    }
}
