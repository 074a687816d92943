//! CSV backend tests
//!
//! Exercises the flat-file variant against a real temporary directory:
//! per-location file naming, header-only-on-create, and append-only
//! accumulation across repeated runs.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

use shared::{CurrentObservation, ForecastDay, WeatherAlert};
use weather_watch_ingestor::store::{CsvStore, WeatherStore};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn observation() -> CurrentObservation {
    CurrentObservation {
        obs_time: Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap(),
        temp_f: Some(dec("42.1")),
        condition_text: Some("Cloudy".to_string()),
        condition_code: Some(1006),
        wind_mph: Some(dec("9.4")),
        gust_mph: None,
        precip_in: None,
        cloud: Some(75),
        raw: json!({"temp_f": 42.1}),
    }
}

fn forecast_day(date: &str) -> ForecastDay {
    ForecastDay {
        date: date.parse().unwrap(),
        maxtemp_f: Some(dec("45.0")),
        mintemp_f: Some(dec("30.0")),
        maxwind_mph: None,
        totalprecip_in: None,
        totalsnow_cm: None,
        condition_text: Some("Partly cloudy".to_string()),
        condition_code: Some(1003),
        daily_chance_of_rain: 0,
        daily_chance_of_snow: 0,
        raw: json!({}),
    }
}

fn alert(headline: &str) -> WeatherAlert {
    WeatherAlert {
        headline: Some(headline.to_string()),
        severity: Some("Moderate".to_string()),
        areas: Some("Monroe".to_string()),
        certainty: Some("Likely".to_string()),
        event: Some("Lake Effect Snow Warning".to_string()),
        note: None,
        effective: Some(Utc.with_ymd_and_hms(2023, 11, 14, 20, 0, 0).unwrap()),
        expires: None,
        raw: json!({"headline": headline}),
    }
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn current_file_gets_one_header_and_appends() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().to_path_buf());
    store.init().await.unwrap();

    let location = store.resolve_location("Rochester,NY", None).await.unwrap();
    store.upsert_current(&location, &observation()).await.unwrap();
    store.upsert_current(&location, &observation()).await.unwrap();

    let path = dir.path().join("Rochester_NY_current.csv");
    let lines = read_lines(&path);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("location,obs_time,temp_f,condition_text"));
    // the query contains a comma, so the csv writer quotes the field
    assert!(lines[1].starts_with("\"Rochester,NY\""));
    assert!(lines[1].contains("42.1"));
    assert!(lines[2].contains("42.1"));
}

#[tokio::test]
async fn forecast_rows_append_per_day() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().to_path_buf());
    store.init().await.unwrap();

    let location = store.resolve_location("Rochester,NY", None).await.unwrap();
    let days = vec![forecast_day("2023-11-15"), forecast_day("2023-11-16")];
    store.upsert_forecast_days(&location, &days).await.unwrap();

    let path = dir.path().join("Rochester_NY_forecast.csv");
    let lines = read_lines(&path);
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("2023-11-15"));
    assert!(lines[2].contains("2023-11-16"));
}

#[tokio::test]
async fn empty_forecast_batch_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().to_path_buf());
    store.init().await.unwrap();

    let location = store.resolve_location("Rochester,NY", None).await.unwrap();
    store.upsert_forecast_days(&location, &[]).await.unwrap();

    assert!(!dir.path().join("Rochester_NY_forecast.csv").exists());
}

#[tokio::test]
async fn alerts_accumulate_and_report_their_count() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().to_path_buf());
    store.init().await.unwrap();

    let location = store.resolve_location("Rochester,NY", None).await.unwrap();
    let alerts = vec![alert("Snow"), alert("Wind")];

    let first = store.append_alerts(&location, &alerts).await.unwrap();
    let second = store.append_alerts(&location, &alerts).await.unwrap();
    assert_eq!(first, 2);
    assert_eq!(second, 2);

    let path = dir.path().join("Rochester_NY_alerts.csv");
    let lines = read_lines(&path);
    // one header plus 2N data rows
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("location,headline,severity"));
}

#[tokio::test]
async fn empty_alert_batch_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().to_path_buf());
    store.init().await.unwrap();

    let location = store.resolve_location("Rochester,NY", None).await.unwrap();
    let inserted = store.append_alerts(&location, &[]).await.unwrap();
    assert_eq!(inserted, 0);
    assert!(!dir.path().join("Rochester_NY_alerts.csv").exists());
}

#[tokio::test]
async fn init_creates_the_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("exports").join("weather");
    let store = CsvStore::new(nested.clone());
    store.init().await.unwrap();
    assert!(nested.is_dir());
}
