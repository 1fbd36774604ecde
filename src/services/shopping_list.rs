//! Shopping list aggregation
//!
//! Merges the ingredient lines of every recipe in a user's cart into one
//! consolidated list. Grouping is keyed by (ingredient name, measurement
//! unit) rather than by catalog id: two catalog rows that share a name and
//! unit collapse into one output line. The result renders as a flat UTF-8
//! text document served as a download.

use crate::db::repositories::CartRepository;
use crate::models::IngredientLine;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::ServiceError;

/// One consolidated shopping list line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListEntry {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Sum of amounts across all contributing recipes
    pub total_amount: i64,
}

/// Merge ingredient lines into consolidated entries.
///
/// Entries come back sorted lexicographically by name, ties broken by unit.
pub fn aggregate_lines(lines: &[IngredientLine]) -> Vec<ShoppingListEntry> {
    let mut groups: BTreeMap<(String, String), i64> = BTreeMap::new();

    for line in lines {
        *groups
            .entry((line.name.clone(), line.measurement_unit.clone()))
            .or_insert(0) += line.amount;
    }

    groups
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingListEntry {
            name,
            measurement_unit,
            total_amount,
        })
        .collect()
}

/// Render consolidated entries as the downloadable text document.
pub fn render_entries(entries: &[ShoppingListEntry]) -> Vec<u8> {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{} ({}) - {}\n",
            entry.name, entry.measurement_unit, entry.total_amount
        ));
    }
    out.into_bytes()
}

/// Shopping list service backed by the user's cart.
pub struct ShoppingListService {
    cart_repo: Arc<dyn CartRepository>,
}

impl ShoppingListService {
    pub fn new(cart_repo: Arc<dyn CartRepository>) -> Self {
        Self { cart_repo }
    }

    /// Consolidated entries for everything in the user's cart.
    ///
    /// An empty cart yields an empty list, not an error.
    pub async fn aggregate(&self, user_id: i64) -> Result<Vec<ShoppingListEntry>, ServiceError> {
        let lines = self
            .cart_repo
            .cart_lines(user_id)
            .await
            .context("Failed to collect cart lines")?;
        Ok(aggregate_lines(&lines))
    }

    /// The downloadable text document for the user's cart.
    pub async fn document(&self, user_id: i64) -> Result<Vec<u8>, ServiceError> {
        let entries = self.aggregate(user_id).await?;
        Ok(render_entries(&entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i64) -> IngredientLine {
        IngredientLine {
            ingredient_id: 0,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_same_name_and_unit_merge() {
        let entries = aggregate_lines(&[line("Salt", "g", 5), line("Salt", "g", 3)]);
        assert_eq!(
            entries,
            vec![ShoppingListEntry {
                name: "Salt".to_string(),
                measurement_unit: "g".to_string(),
                total_amount: 8,
            }]
        );
    }

    #[test]
    fn test_same_name_different_unit_stay_separate() {
        let entries = aggregate_lines(&[line("Salt", "g", 5), line("Salt", "pinch", 2)]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].measurement_unit, "g");
        assert_eq!(entries[1].measurement_unit, "pinch");
    }

    #[test]
    fn test_distinct_catalog_ids_with_same_name_unit_merge() {
        // Grouping is by (name, unit), not by catalog id
        let mut a = line("Salt", "g", 5);
        a.ingredient_id = 1;
        let mut b = line("Salt", "g", 3);
        b.ingredient_id = 2;

        let entries = aggregate_lines(&[a, b]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].total_amount, 8);
    }

    #[test]
    fn test_output_sorted_by_name() {
        let entries = aggregate_lines(&[
            line("Zucchini", "g", 1),
            line("Apple", "g", 2),
            line("Milk", "ml", 3),
        ]);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Milk", "Zucchini"]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate_lines(&[]).is_empty());
        assert!(render_entries(&[]).is_empty());
    }

    #[test]
    fn test_render_format() {
        let entries = aggregate_lines(&[line("Salt", "g", 5), line("Salt", "g", 3)]);
        let text = String::from_utf8(render_entries(&entries)).unwrap();
        assert_eq!(text, "Salt (g) - 8\n");
    }

    #[test]
    fn test_render_is_utf8_with_non_ascii_names() {
        let entries = aggregate_lines(&[line("Перец чёрный", "г", 2)]);
        let text = String::from_utf8(render_entries(&entries)).unwrap();
        assert_eq!(text, "Перец чёрный (г) - 2\n");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn line_strategy() -> impl Strategy<Value = IngredientLine> {
            (
                "[a-e]{1,3}",
                prop_oneof![Just("g".to_string()), Just("ml".to_string())],
                1i64..100,
            )
                .prop_map(|(name, unit, amount)| IngredientLine {
                    ingredient_id: 0,
                    name,
                    measurement_unit: unit,
                    amount,
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// The total amount is preserved by aggregation.
            #[test]
            fn property_sum_preserved(lines in proptest::collection::vec(line_strategy(), 0..30)) {
                let entries = aggregate_lines(&lines);
                let input_sum: i64 = lines.iter().map(|l| l.amount).sum();
                let output_sum: i64 = entries.iter().map(|e| e.total_amount).sum();
                prop_assert_eq!(input_sum, output_sum);
            }

            /// Each (name, unit) pair appears at most once in the output.
            #[test]
            fn property_groups_unique(lines in proptest::collection::vec(line_strategy(), 0..30)) {
                let entries = aggregate_lines(&lines);
                let mut keys: Vec<(&str, &str)> = entries
                    .iter()
                    .map(|e| (e.name.as_str(), e.measurement_unit.as_str()))
                    .collect();
                let before = keys.len();
                keys.sort();
                keys.dedup();
                prop_assert_eq!(before, keys.len());
            }

            /// Output is sorted by name, ties broken by unit.
            #[test]
            fn property_output_sorted(lines in proptest::collection::vec(line_strategy(), 0..30)) {
                let entries = aggregate_lines(&lines);
                for pair in entries.windows(2) {
                    let a = (&pair[0].name, &pair[0].measurement_unit);
                    let b = (&pair[1].name, &pair[1].measurement_unit);
                    prop_assert!(a < b);
                }
            }

            /// Rendering emits one newline-terminated line per entry.
            #[test]
            fn property_render_line_count(lines in proptest::collection::vec(line_strategy(), 0..30)) {
                let entries = aggregate_lines(&lines);
                let text = String::from_utf8(render_entries(&entries)).unwrap();
                prop_assert_eq!(text.matches('\n').count(), entries.len());
                if !text.is_empty() {
                    prop_assert!(text.ends_with('\n'));
                }
            }
        }
    }
}
