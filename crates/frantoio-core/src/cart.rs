//! # Cart Module
//!
//! Pure cart math: merging lines, quantity updates, subtotal and
//! shipping-weight totals.
//!
//! The cart itself lives in the storefront (localStorage); the backend
//! receives it as the checkout payload and re-prices every line against
//! the catalog before creating the order. This module is that shared
//! arithmetic.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// A single cart line, carrying the product snapshot needed for pricing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    /// Gross unit price in euro cents.
    pub unit_price_cents: i64,
    /// Shipping weight per unit, in grams.
    pub weight_grams: i64,
    pub quantity: i64,
}

impl CartItem {
    /// Gross line total.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }

    /// Total shipping weight of the line.
    #[inline]
    pub const fn line_weight_grams(&self) -> i64 {
        self.weight_grams * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// An in-memory cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Returns the cart lines.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Checks whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds an item, merging with an existing line for the same product.
    ///
    /// ## Errors
    /// - `CartTooLarge` when adding a new line past [`MAX_CART_ITEMS`]
    /// - `QuantityTooLarge` when the merged quantity exceeds
    ///   [`MAX_ITEM_QUANTITY`]
    pub fn add_item(&mut self, item: CartItem) -> CoreResult<()> {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            let merged = existing.quantity + item.quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            existing.quantity = merged;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }
        if item.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: item.quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        self.items.push(item);
        Ok(())
    }

    /// Sets the quantity of a line; zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let pos = self
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::CartItemNotFound(product_id.to_string()))?;

        if quantity == 0 {
            self.items.remove(pos);
        } else {
            self.items[pos].quantity = quantity;
        }
        Ok(())
    }

    /// Removes a line.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return Err(CoreError::CartItemNotFound(product_id.to_string()));
        }
        Ok(())
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Gross subtotal across all lines.
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.line_total())
    }

    /// Total shipping weight across all lines, in grams.
    pub fn total_weight_grams(&self) -> i64 {
        self.items.iter().map(CartItem::line_weight_grams).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bottle(id: &str, price: i64, weight: i64, qty: i64) -> CartItem {
        CartItem {
            product_id: id.to_string(),
            name: format!("Product {id}"),
            unit_price_cents: price,
            weight_grams: weight,
            quantity: qty,
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        cart.add_item(bottle("p1", 1850, 900, 2)).unwrap();
        cart.add_item(bottle("p1", 1850, 900, 1)).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.subtotal().cents(), 5550);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add_item(bottle("p1", 1850, 900, 2)).unwrap();
        cart.add_item(bottle("p2", 4900, 2600, 1)).unwrap();

        assert_eq!(cart.subtotal().cents(), 1850 * 2 + 4900);
        assert_eq!(cart.total_weight_grams(), 900 * 2 + 2600);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new();
        cart.add_item(bottle("p1", 1850, 900, 2)).unwrap();

        cart.update_quantity("p1", 5).unwrap();
        assert_eq!(cart.items()[0].quantity, 5);

        // Zero removes the line
        cart.update_quantity("p1", 0).unwrap();
        assert!(cart.is_empty());

        assert!(matches!(
            cart.update_quantity("p1", 1),
            Err(CoreError::CartItemNotFound(_))
        ));
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        cart.add_item(bottle("p1", 1850, 900, 1)).unwrap();

        cart.remove_item("p1").unwrap();
        assert!(cart.is_empty());
        assert!(cart.remove_item("p1").is_err());
    }

    #[test]
    fn test_quantity_cap() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(bottle("p1", 1850, 900, MAX_ITEM_QUANTITY + 1)),
            Err(CoreError::QuantityTooLarge { .. })
        ));

        cart.add_item(bottle("p1", 1850, 900, MAX_ITEM_QUANTITY - 1))
            .unwrap();
        assert!(matches!(
            cart.add_item(bottle("p1", 1850, 900, 2)),
            Err(CoreError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn test_line_cap() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(bottle(&format!("p{i}"), 1000, 500, 1)).unwrap();
        }
        assert!(matches!(
            cart.add_item(bottle("one-too-many", 1000, 500, 1)),
            Err(CoreError::CartTooLarge { .. })
        ));
    }
}
