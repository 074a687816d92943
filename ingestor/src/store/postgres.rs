//! PostgreSQL storage backend
//!
//! Natural-key upserts give the only consistency guarantee the pipeline
//! needs: repeated ingestion of the same response converges to one row per
//! (location, instant) and one per (location, date), while alerts accumulate.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::AppResult;
use crate::store::WeatherStore;
use shared::{CurrentObservation, ForecastDay, Location, WeatherAlert};

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool using the configured limits
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeatherStore for PgStore {
    /// Create the four tables and their natural-key constraints
    ///
    /// Every statement is a no-op when the structure already exists, so this
    /// runs unconditionally at startup.
    async fn init(&self) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                id    UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                query TEXT NOT NULL UNIQUE,
                name  TEXT
            );
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS current_observations (
                id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                location_id    UUID NOT NULL REFERENCES locations(id),
                obs_time       TIMESTAMPTZ NOT NULL,
                temp_f         NUMERIC,
                condition_text TEXT,
                condition_code INTEGER,
                wind_mph       NUMERIC,
                gust_mph       NUMERIC,
                precip_in      NUMERIC,
                cloud          INTEGER,
                raw            JSONB,
                UNIQUE (location_id, obs_time)
            );
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS forecast_days (
                id                   UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                location_id          UUID NOT NULL REFERENCES locations(id),
                forecast_date        DATE NOT NULL,
                maxtemp_f            NUMERIC,
                mintemp_f            NUMERIC,
                maxwind_mph          NUMERIC,
                totalprecip_in      NUMERIC,
                totalsnow_cm         NUMERIC,
                condition_text       TEXT,
                condition_code       INTEGER,
                daily_chance_of_rain INTEGER NOT NULL DEFAULT 0,
                daily_chance_of_snow INTEGER NOT NULL DEFAULT 0,
                raw                  JSONB,
                UNIQUE (location_id, forecast_date)
            );
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS weather_alerts (
                id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                location_id UUID NOT NULL REFERENCES locations(id),
                headline    TEXT,
                severity    TEXT,
                areas       TEXT,
                certainty   TEXT,
                event       TEXT,
                note        TEXT,
                effective   TIMESTAMPTZ,
                expires     TIMESTAMPTZ,
                raw         JSONB,
                ingested_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Single-statement upsert keyed by the query string
    ///
    /// COALESCE keeps the stored name when one exists; the incoming name only
    /// fills a gap.
    async fn resolve_location(
        &self,
        query: &str,
        display_name: Option<&str>,
    ) -> AppResult<Location> {
        let (id, query, name) = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
            r#"
            INSERT INTO locations (query, name)
            VALUES ($1, $2)
            ON CONFLICT (query) DO UPDATE
                SET name = COALESCE(locations.name, EXCLUDED.name)
            RETURNING id, query, name
            "#,
        )
        .bind(query)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(Location { id, query, name })
    }

    async fn upsert_current(
        &self,
        location: &Location,
        observation: &CurrentObservation,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO current_observations (
                location_id, obs_time, temp_f, condition_text, condition_code,
                wind_mph, gust_mph, precip_in, cloud, raw
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (location_id, obs_time) DO UPDATE SET
                temp_f = EXCLUDED.temp_f,
                condition_text = EXCLUDED.condition_text,
                condition_code = EXCLUDED.condition_code,
                wind_mph = EXCLUDED.wind_mph,
                gust_mph = EXCLUDED.gust_mph,
                precip_in = EXCLUDED.precip_in,
                cloud = EXCLUDED.cloud,
                raw = EXCLUDED.raw
            "#,
        )
        .bind(location.id)
        .bind(observation.obs_time)
        .bind(observation.temp_f)
        .bind(&observation.condition_text)
        .bind(observation.condition_code)
        .bind(observation.wind_mph)
        .bind(observation.gust_mph)
        .bind(observation.precip_in)
        .bind(observation.cloud)
        .bind(&observation.raw)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// One transaction per batch; a refreshed forecast replaces the earlier
    /// row for the same date
    async fn upsert_forecast_days(
        &self,
        location: &Location,
        days: &[ForecastDay],
    ) -> AppResult<()> {
        if days.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for day in days {
            sqlx::query(
                r#"
                INSERT INTO forecast_days (
                    location_id, forecast_date, maxtemp_f, mintemp_f, maxwind_mph,
                    totalprecip_in, totalsnow_cm, condition_text, condition_code,
                    daily_chance_of_rain, daily_chance_of_snow, raw
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (location_id, forecast_date) DO UPDATE SET
                    maxtemp_f = EXCLUDED.maxtemp_f,
                    mintemp_f = EXCLUDED.mintemp_f,
                    maxwind_mph = EXCLUDED.maxwind_mph,
                    totalprecip_in = EXCLUDED.totalprecip_in,
                    totalsnow_cm = EXCLUDED.totalsnow_cm,
                    condition_text = EXCLUDED.condition_text,
                    condition_code = EXCLUDED.condition_code,
                    daily_chance_of_rain = EXCLUDED.daily_chance_of_rain,
                    daily_chance_of_snow = EXCLUDED.daily_chance_of_snow,
                    raw = EXCLUDED.raw
                "#,
            )
            .bind(location.id)
            .bind(day.date)
            .bind(day.maxtemp_f)
            .bind(day.mintemp_f)
            .bind(day.maxwind_mph)
            .bind(day.totalprecip_in)
            .bind(day.totalsnow_cm)
            .bind(&day.condition_text)
            .bind(day.condition_code)
            .bind(day.daily_chance_of_rain)
            .bind(day.daily_chance_of_snow)
            .bind(&day.raw)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Plain inserts: the source has no stable alert identity, so every run
    /// that observes an alert stores it again
    async fn append_alerts(
        &self,
        location: &Location,
        alerts: &[WeatherAlert],
    ) -> AppResult<usize> {
        if alerts.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        for alert in alerts {
            sqlx::query(
                r#"
                INSERT INTO weather_alerts (
                    location_id, headline, severity, areas, certainty,
                    event, note, effective, expires, raw
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(location.id)
            .bind(&alert.headline)
            .bind(&alert.severity)
            .bind(&alert.areas)
            .bind(&alert.certainty)
            .bind(&alert.event)
            .bind(&alert.note)
            .bind(alert.effective)
            .bind(alert.expires)
            .bind(&alert.raw)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(alerts.len())
    }
}
