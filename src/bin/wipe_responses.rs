//! Administrative wipe of all stored survey responses
//!
//! The HTTP service never deletes responses; this standalone binary is the
//! out-of-band path for clearing the collection between survey runs.
//!
//! ```sh
//! cargo run --bin wipe_responses
//! ```

use survey_backend::{config::Config, survey::SurveyDb};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    let db = SurveyDb::new(&config.database.path).await?;

    let deleted = db.delete_all_responses().await?;
    info!("Wiped {} responses from {}", deleted, config.database.path);

    Ok(())
}
