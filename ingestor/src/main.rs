//! Weather Watch - ingestion runner
//!
//! One invocation performs one ingestion pass over the configured watch-list
//! and exits.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_watch_ingestor::config::{Config, StorageBackend};
use weather_watch_ingestor::external::WeatherClient;
use weather_watch_ingestor::services::IngestService;
use weather_watch_ingestor::store::{CsvStore, PgStore, WeatherStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wx_ingest=info,weather_watch_ingestor=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Weather Watch ingestion run");
    tracing::info!("Environment: {}", config.environment);

    let store: Box<dyn WeatherStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            let database = config.database.as_ref().ok_or_else(|| {
                anyhow::anyhow!("database.url must be configured for the postgres backend")
            })?;
            tracing::info!("Connecting to database...");
            let store = PgStore::connect(database).await?;
            tracing::info!("Database connection established");
            Box::new(store)
        }
        StorageBackend::Csv => {
            tracing::info!("Writing CSV files to {}", config.storage.csv_dir.display());
            Box::new(CsvStore::new(config.storage.csv_dir.clone()))
        }
    };

    store.init().await?;

    let client = WeatherClient::new(
        config.weather.api_key.clone(),
        config.weather.api_endpoint.clone(),
    )?;

    let locations = config.weather.location_list();
    let service = IngestService::new(Box::new(client), store);
    let summary = service
        .run(
            &locations,
            config.weather.forecast_days,
            config.weather.rate_delay(),
        )
        .await;

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        alerts = summary.alerts_inserted,
        "ingestion run complete"
    );

    if summary.succeeded == 0 && summary.failed > 0 {
        anyhow::bail!("every configured location failed to ingest");
    }

    Ok(())
}
