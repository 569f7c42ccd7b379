//! Deliverables cart: priced line items of creator + content format.

#[cfg(test)]
#[path = "cart_test.rs"]
mod cart_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    Post,
    Reel,
    Story,
    Video,
    Short,
    Live,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub format: ContentFormat,
    pub unit_price: f64,
    pub quantity: u32,
}

impl Deliverable {
    #[must_use]
    pub fn new(creator_id: Uuid, creator_name: impl Into<String>, format: ContentFormat, unit_price: f64, quantity: u32) -> Self {
        Self { id: Uuid::new_v4(), creator_id, creator_name: creator_name.into(), format, unit_price, quantity }
    }

    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("unit price {0} must be a non-negative number")]
    InvalidPrice(f64),
    #[error("deliverable {0} not in cart")]
    UnknownItem(Uuid),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliverableCart {
    items: Vec<Deliverable>,
}

impl DeliverableCart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[Deliverable] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.items.iter().map(Deliverable::line_total).sum()
    }

    /// Add a line. A line for the same creator and format absorbs the new
    /// quantity and takes the newer unit price. Returns the id of the line
    /// that holds the item.
    ///
    /// # Errors
    ///
    /// Rejects zero quantities and negative or non-finite prices.
    pub fn add(&mut self, item: Deliverable) -> Result<Uuid, CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(CartError::InvalidPrice(item.unit_price));
        }

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.creator_id == item.creator_id && line.format == item.format)
        {
            line.quantity = line.quantity.saturating_add(item.quantity);
            line.unit_price = item.unit_price;
            return Ok(line.id);
        }
        let id = item.id;
        self.items.push(item);
        Ok(id)
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownItem`] if no line has `id`.
    pub fn set_quantity(&mut self, id: Uuid, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(id).map(|_| ());
        }
        let line = self.items.iter_mut().find(|line| line.id == id).ok_or(CartError::UnknownItem(id))?;
        line.quantity = quantity;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`CartError::UnknownItem`] if no line has `id`.
    pub fn remove(&mut self, id: Uuid) -> Result<Deliverable, CartError> {
        let index = self.items.iter().position(|line| line.id == id).ok_or(CartError::UnknownItem(id))?;
        Ok(self.items.remove(index))
    }
}
