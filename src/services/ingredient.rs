//! Ingredient service
//!
//! Read access to the ingredient catalog plus the CSV seeding used to
//! populate it. Catalog rows are immutable reference data; the seeder skips
//! (name, unit) pairs that already exist so re-running it is harmless.

use crate::db::repositories::IngredientRepository;
use crate::models::Ingredient;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

use super::ServiceError;

/// Outcome of a catalog seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Rows inserted
    pub inserted: usize,
    /// Rows skipped because the (name, unit) pair already existed
    pub skipped: usize,
}

/// Ingredient catalog service.
pub struct IngredientService {
    repo: Arc<dyn IngredientRepository>,
}

impl IngredientService {
    pub fn new(repo: Arc<dyn IngredientRepository>) -> Self {
        Self { repo }
    }

    /// Get an ingredient by ID.
    pub async fn get(&self, id: i64) -> Result<Ingredient, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get ingredient")?
            .ok_or_else(|| ServiceError::NotFound(format!("Ingredient {} not found", id)))
    }

    /// List the catalog, optionally restricted to a case-insensitive name
    /// prefix.
    pub async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ServiceError> {
        let ingredients = match name_prefix {
            Some(prefix) if !prefix.is_empty() => self
                .repo
                .search_by_prefix(prefix)
                .await
                .context("Failed to search ingredients")?,
            _ => self.repo.list().await.context("Failed to list ingredients")?,
        };
        Ok(ingredients)
    }

    /// Seed the catalog from a `name,measurement_unit` CSV file.
    ///
    /// The first row is treated as a header and skipped, matching the
    /// shipped catalog file.
    pub async fn seed_from_csv(&self, path: &Path) -> Result<SeedReport, ServiceError> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CSV: {}", path.display()))?;

        let mut report = SeedReport::default();

        for line in content.lines().skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (name, unit) = parse_csv_row(line).ok_or_else(|| {
                ServiceError::Validation(format!("Malformed CSV row: {}", line))
            })?;

            let inserted = self
                .repo
                .insert(&Ingredient::new(name, unit))
                .await
                .context("Failed to insert ingredient")?;

            if inserted {
                report.inserted += 1;
            } else {
                report.skipped += 1;
            }
        }

        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            "ingredient catalog seeded"
        );
        Ok(report)
    }
}

/// Parse one `name,measurement_unit` row.
///
/// The name may be double-quoted to carry embedded commas.
fn parse_csv_row(line: &str) -> Option<(String, String)> {
    if let Some(rest) = line.strip_prefix('"') {
        let (name, rest) = rest.split_once('"')?;
        let unit = rest.strip_prefix(',')?;
        Some((name.to_string(), unit.trim().to_string()))
    } else {
        let (name, unit) = line.split_once(',')?;
        Some((name.trim().to_string(), unit.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxIngredientRepository;
    use crate::db::{create_test_pool, migrations};
    use std::io::Write;

    async fn setup_service() -> IngredientService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        IngredientService::new(SqlxIngredientRepository::boxed(pool))
    }

    #[test]
    fn test_parse_csv_row_plain() {
        assert_eq!(
            parse_csv_row("salt,g"),
            Some(("salt".to_string(), "g".to_string()))
        );
    }

    #[test]
    fn test_parse_csv_row_quoted_name_with_comma() {
        assert_eq!(
            parse_csv_row("\"salt, coarse\",g"),
            Some(("salt, coarse".to_string(), "g".to_string()))
        );
    }

    #[test]
    fn test_parse_csv_row_malformed() {
        assert_eq!(parse_csv_row("no-comma-here"), None);
        assert_eq!(parse_csv_row("\"unterminated,g"), None);
    }

    #[tokio::test]
    async fn test_seed_from_csv() {
        let service = setup_service().await;

        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "name,measurement_unit").unwrap();
        writeln!(file, "salt,g").unwrap();
        writeln!(file, "milk,ml").unwrap();
        writeln!(file, "\"pepper, black\",g").unwrap();

        let report = service
            .seed_from_csv(file.path())
            .await
            .expect("Seeding should succeed");
        assert_eq!(report, SeedReport { inserted: 3, skipped: 0 });

        let all = service.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().any(|i| i.name == "pepper, black"));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let service = setup_service().await;

        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "name,measurement_unit").unwrap();
        writeln!(file, "salt,g").unwrap();

        service.seed_from_csv(file.path()).await.unwrap();
        let second = service.seed_from_csv(file.path()).await.unwrap();
        assert_eq!(second, SeedReport { inserted: 0, skipped: 1 });

        assert_eq!(service.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_ingredient() {
        let service = setup_service().await;
        let result = service.get(404).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_with_prefix() {
        let service = setup_service().await;

        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "name,measurement_unit").unwrap();
        writeln!(file, "cabbage,g").unwrap();
        writeln!(file, "carrot,g").unwrap();
        writeln!(file, "salt,g").unwrap();
        service.seed_from_csv(file.path()).await.unwrap();

        let hits = service.list(Some("ca")).await.unwrap();
        assert_eq!(hits.len(), 2);

        // Empty prefix behaves like no filter
        let all = service.list(Some("")).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
