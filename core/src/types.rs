//! Domain DTOs for the animal API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single animal record as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Animal {
    pub id: i64,
    pub name: String,
}

impl Animal {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Request payload for renaming an existing animal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameAnimal {
    pub name: String,
}

/// Inclusive range the add flow draws client-side ids from.
///
/// Ids are not checked against the current collection, so two adds can
/// collide. The server may resolve this by assigning its own id in the
/// create response, which the store then adopts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdRange {
    pub min: i64,
    pub max: i64,
}

impl Default for IdRange {
    fn default() -> Self {
        Self { min: 1, max: 1000 }
    }
}

impl IdRange {
    pub fn contains(&self, id: i64) -> bool {
        (self.min..=self.max).contains(&id)
    }

    /// Draw a random id from the range. A range with `min > max` yields `min`.
    pub fn generate(&self) -> i64 {
        let span = (i128::from(self.max) - i128::from(self.min) + 1).max(1) as u128;
        let offset = Uuid::new_v4().as_u128() % span;
        (i128::from(self.min) + offset as i128) as i64
    }
}
