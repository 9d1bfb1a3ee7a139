//! Category sampling for spawned orders and payments.
//!
//! Each spawn envelope carries one order draw and one payment draw. A draw
//! picks a category uniformly, then a subtype uniformly within it, then a
//! value uniformly in `[VALUE_MIN, VALUE_MAX]`, and stamps a fresh identifier.
//! All randomness comes from the session's `RngManager`.
//!
//! # Example
//!
//! ```
//! use flowprobe_core_rs::rng::RngManager;
//! use flowprobe_core_rs::sampling::CategorySampler;
//!
//! let mut rng = RngManager::new(42);
//! let orders = CategorySampler::orders();
//! let draw = orders.sample(&mut rng).unwrap();
//! assert!((1..=50).contains(&draw.value));
//! ```

use crate::models::CategoryDraw;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest value a draw can carry
pub const VALUE_MIN: u32 = 1;

/// Largest value a draw can carry
pub const VALUE_MAX: u32 = 50;

/// Errors raised while sampling a draw
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SamplingError {
    #[error("category table is empty")]
    EmptyTable,

    #[error("category {0:?} has no subtypes")]
    EmptyCategory(String),
}

/// One category and the subtypes it can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub name: String,
    pub subtypes: Vec<String>,
}

impl Category {
    pub fn new(name: &str, subtypes: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            subtypes: subtypes.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Uniform two-level category generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySampler {
    pub categories: Vec<Category>,
}

impl CategorySampler {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Order categories: mobile, retail and desktop channels.
    pub fn orders() -> Self {
        Self::new(vec![
            Category::new("mobile", &["apple", "android"]),
            Category::new("retail", &["windows", "raspberry-pi"]),
            Category::new("desktop", &["safari", "chrome"]),
        ])
    }

    /// Payment categories: cards, providers and platform wallets.
    pub fn payments() -> Self {
        Self::new(vec![
            Category::new("cards", &["visa", "mastercard"]),
            Category::new("provider", &["paypal", "stripe", "amazon-pay"]),
            Category::new("platform", &["apple-pay", "google-pay"]),
        ])
    }

    /// Check that every draw can succeed.
    pub fn validate(&self) -> Result<(), SamplingError> {
        if self.categories.is_empty() {
            return Err(SamplingError::EmptyTable);
        }
        match self.categories.iter().find(|c| c.subtypes.is_empty()) {
            Some(category) => Err(SamplingError::EmptyCategory(category.name.clone())),
            None => Ok(()),
        }
    }

    /// Draw one category/subtype/value triple with a fresh identifier.
    pub fn sample(&self, rng: &mut RngManager) -> Result<CategoryDraw, SamplingError> {
        let category = rng
            .index(self.categories.len())
            .map(|i| &self.categories[i])
            .ok_or(SamplingError::EmptyTable)?;

        let subtype = rng
            .index(category.subtypes.len())
            .map(|i| &category.subtypes[i])
            .ok_or_else(|| SamplingError::EmptyCategory(category.name.clone()))?;

        let value = rng.range_inclusive(VALUE_MIN as i64, VALUE_MAX as i64) as u32;

        Ok(CategoryDraw {
            uuid: rng.uuid(),
            category: category.name.clone(),
            subtype: subtype.clone(),
            value,
        })
    }
}
