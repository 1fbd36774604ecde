//! Ingredient model
//!
//! Immutable reference data seeded from a CSV import. The (name,
//! measurement_unit) pair is unique: "Salt" measured in grams and "Salt"
//! measured in pinches are distinct catalog rows.

use serde::{Deserialize, Serialize};

/// A catalog ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique identifier
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Unit the amount is expressed in (g, ml, pieces, ...)
    pub measurement_unit: String,
}

impl Ingredient {
    pub fn new(name: String, measurement_unit: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            measurement_unit,
        }
    }
}
