//! Ingredient catalog seeder
//!
//! Loads `name,measurement_unit` rows from a CSV file into the catalog.
//! Re-running is harmless: existing (name, unit) pairs are skipped.
//!
//! Usage: seed-ingredients <path/to/ingredients.csv>

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use forkful::config::Config;
use forkful::db::repositories::SqlxIngredientRepository;
use forkful::db::{self, migrations};
use forkful::services::IngredientService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forkful=info".into()),
        )
        .init();

    let Some(csv_path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("Usage: seed-ingredients <path/to/ingredients.csv>");
    };

    let config = Config::load_with_env(Path::new("config.yml"))?;
    let pool = db::create_pool(&config.database).await?;
    migrations::run_migrations(&pool).await?;

    let service = IngredientService::new(SqlxIngredientRepository::boxed(pool));
    let report = service.seed_from_csv(&csv_path).await?;

    println!(
        "Seeded ingredient catalog: {} inserted, {} skipped",
        report.inserted, report.skipped
    );

    Ok(())
}
