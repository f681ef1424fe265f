//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the listing API and run the
//! full crawl cycle end-to-end: inputs, retries, normalization, projection
//! and the output sinks.

use chrono::NaiveDate;
use serde_json::{json, Value};
use shelfscan::config::{ApiConfig, Config, CrawlerConfig, InputConfig, OutputConfig};
use shelfscan::crawler::{crawl, CrawlOrchestrator, CrawlerSettings, RecordingSleeper};
use shelfscan::input::{Category, Location, StaticTaskSource, TaskInputs};
use shelfscan::output::{load_latest_run_from, RunStatus};
use shelfscan::ShelfError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/v1/layout/listing_widgets";

fn capture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

/// One listing item with the given product id
fn listing_item(product_id: i64, name: &str) -> Value {
    json!({
        "data": {
            "is_sold_out": false,
            "tracking": {"common_attributes": {"badge": ""}},
            "atc_action": {
                "add_to_cart": {
                    "cart_item": {
                        "merchant_id": 30125,
                        "product_id": product_id,
                        "display_name": name,
                        "price": 27,
                        "mrp": 28
                    }
                }
            }
        }
    })
}

fn listing(items: Vec<Value>) -> Value {
    json!({"response": {"snippets": items}})
}

fn settings_for(server: &MockServer) -> CrawlerSettings {
    let endpoint = Url::parse(&format!("{}{}", server.uri(), LISTING_PATH)).unwrap();
    CrawlerSettings::new(endpoint, "test-token")
}

fn two_by_two() -> TaskInputs {
    TaskInputs {
        locations: vec![Location::new(28.6139, 77.209), Location::new(19.076, 72.8777)],
        categories: vec![
            Category::new("Dairy & Breakfast", "14", "Milk", "922"),
            Category::new("Snacks & Munchies", "1237", "Chips", "1238"),
        ],
        output_fields: vec![
            "date".to_string(),
            "l1_category".to_string(),
            "variant_id".to_string(),
        ],
    }
}

/// Mounts a listing response for one (latitude, l2 id) pair
async fn mount_listing(server: &MockServer, lat: &str, l2_id: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .and(header("lat", lat))
        .and(query_param("category_l1", l2_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Writes the three input tables and returns a config pointing at them
fn write_config(dir: &TempDir, server: &MockServer, categories: &str) -> Config {
    let locations_path = dir.path().join("locations.csv");
    let categories_path = dir.path().join("categories.csv");
    let schema_path = dir.path().join("schema.csv");

    std::fs::write(&locations_path, "latitude,longitude\n28.6139,77.209\n").unwrap();
    std::fs::write(&categories_path, categories).unwrap();
    std::fs::write(
        &schema_path,
        "Listing export,,\n\
         Field,Type,Notes\n\
         date,date,\n\
         l2_category,str,\n\
         variant_id,int,\n\
         in_stock,bool,\n\
         brand_id,int,\n",
    )
    .unwrap();

    Config {
        api: ApiConfig {
            endpoint_url: format!("{}{}", server.uri(), LISTING_PATH),
            auth_token: "test-token".to_string(),
            user_agent: "shelfscan-test".to_string(),
        },
        crawler: CrawlerConfig {
            rate_limit_cooldown_seconds: 0,
            request_timeout_seconds: 5,
            inter_task_delay_range_seconds: [0.0, 0.0],
            ..CrawlerConfig::default()
        },
        input: InputConfig {
            locations_path: path_string(&locations_path),
            categories_path: path_string(&categories_path),
            schema_path: path_string(&schema_path),
            schema_skip_rows: 1,
            schema_field_column: "Field".to_string(),
        },
        output: OutputConfig {
            csv_path: path_string(&dir.path().join("products.csv")),
            database_path: Some(path_string(&dir.path().join("runs.db"))),
        },
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_two_by_two_crawl_is_location_major() {
    let server = MockServer::start().await;
    mount_listing(&server, "28.6139", "922", listing(vec![listing_item(1, "Delhi Milk")])).await;
    mount_listing(&server, "28.6139", "1238", listing(vec![listing_item(2, "Delhi Chips")])).await;
    mount_listing(&server, "19.076", "922", listing(vec![listing_item(3, "Mumbai Milk")])).await;
    mount_listing(&server, "19.076", "1238", listing(vec![listing_item(4, "Mumbai Chips")])).await;

    let sleeper = Arc::new(RecordingSleeper::new());
    let mut orchestrator =
        CrawlOrchestrator::with_sleeper(&settings_for(&server), sleeper.clone(), capture_date())
            .unwrap();

    let report = orchestrator
        .run(&StaticTaskSource::new(two_by_two()))
        .await
        .unwrap();

    let ids: Vec<Value> = report.records.iter().map(|r| r.variant_id.clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3), json!(4)]);
    assert!(report.records.iter().all(|r| r.date == capture_date()));
    assert_eq!(report.records[0].l2_category, "Milk");
    assert_eq!(report.records[1].l2_category, "Chips");
    assert_eq!(report.records[1].l1_category_id, "1237");

    assert_eq!(report.statistics.tasks_total, 4);
    assert_eq!(report.statistics.tasks_extracted, 4);
    assert_eq!(sleeper.waits().len(), 4);

    let rows = match report.project() {
        shelfscan::ProjectedOutput::Rows(rows) => rows,
        shelfscan::ProjectedOutput::NoData => panic!("expected rows"),
    };
    assert_eq!(rows.columns, vec!["date", "l1_category", "variant_id"]);
    assert_eq!(
        rows.rows[2],
        vec![json!("2024-05-01"), json!("Dairy & Breakfast"), json!(3)]
    );
}

#[tokio::test]
async fn test_failing_location_does_not_affect_others() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("lat", "28.6139"))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;
    mount_listing(&server, "19.076", "922", listing(vec![listing_item(3, "Mumbai Milk")])).await;
    mount_listing(&server, "19.076", "1238", listing(vec![])).await;

    let sleeper = Arc::new(RecordingSleeper::new());
    let mut orchestrator =
        CrawlOrchestrator::with_sleeper(&settings_for(&server), sleeper.clone(), capture_date())
            .unwrap();

    let report = orchestrator
        .run(&StaticTaskSource::new(two_by_two()))
        .await
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].variant_id, json!(3));
    assert_eq!(report.statistics.tasks_forbidden, 2);
    assert_eq!(report.statistics.tasks_no_data, 1);
    assert_eq!(report.statistics.tasks_extracted, 1);
    assert_eq!(sleeper.waits().len(), 4);
}

#[tokio::test]
async fn test_rate_limited_task_cools_down_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(vec![listing_item(7, "Paneer")])),
        )
        .mount(&server)
        .await;

    let inputs = TaskInputs {
        locations: vec![Location::new(28.6139, 77.209)],
        categories: vec![Category::new("Dairy & Breakfast", "14", "Paneer", "923")],
        output_fields: vec!["variant_id".to_string()],
    };

    let sleeper = Arc::new(RecordingSleeper::new());
    let mut orchestrator =
        CrawlOrchestrator::with_sleeper(&settings_for(&server), sleeper.clone(), capture_date())
            .unwrap();
    let report = orchestrator.run(&StaticTaskSource::new(inputs)).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.statistics.rate_limit_cooldowns, 2);
    assert_eq!(sleeper.count_of(Duration::from_secs(60)), 2);
    // Two cooldowns, then the inter-task pause
    assert_eq!(sleeper.waits().len(), 3);
}

#[tokio::test]
async fn test_crawl_writes_csv_and_database() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "28.6139",
        "922",
        listing(vec![listing_item(1, "Toned Milk"), listing_item(2, "Full Cream Milk")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &server,
        "l1_category,l1_category_id,l2_category,l2_category_id\nDairy & Breakfast,14,Milk,922\n",
    );

    let statistics = crawl(&config, "abc123").await.unwrap();
    assert_eq!(statistics.tasks_total, 1);
    assert_eq!(statistics.records, 2);

    let csv = std::fs::read_to_string(&config.output.csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "date,l2_category,variant_id,in_stock,brand_id");
    assert!(lines[1].ends_with(",Milk,1,true,"));
    assert!(lines[2].ends_with(",Milk,2,true,"));

    let database_path = config.output.database_path.as_deref().unwrap();
    let run = load_latest_run_from(Path::new(database_path)).unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "abc123");
    assert_eq!(run.statistics.records, 2);
    assert_eq!(run.columns.len(), 5);
}

#[tokio::test]
async fn test_crawl_without_data_writes_no_csv() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &server,
        "l1_category,l1_category_id,l2_category,l2_category_id\nDairy & Breakfast,14,Milk,922\n",
    );

    let statistics = crawl(&config, "abc123").await.unwrap();

    assert_eq!(statistics.tasks_no_data, 1);
    assert!(!Path::new(&config.output.csv_path).exists());

    let database_path = config.output.database_path.as_deref().unwrap();
    let run = load_latest_run_from(Path::new(database_path)).unwrap().unwrap();
    assert_eq!(run.status, RunStatus::NoData);
}

#[tokio::test]
async fn test_missing_inputs_abort_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = write_config(
        &dir,
        &server,
        "l1_category,l1_category_id,l2_category,l2_category_id\nDairy & Breakfast,14,Milk,922\n",
    );
    config.input.schema_path = path_string(&dir.path().join("missing.csv"));

    let result = crawl(&config, "abc123").await;

    assert!(matches!(result, Err(ShelfError::InputUnavailable(_))));
    assert!(!Path::new(&config.output.csv_path).exists());
}

#[tokio::test]
async fn test_unopenable_database_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(vec![listing_item(1, "Milk")])),
        )
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = write_config(
        &dir,
        &server,
        "l1_category,l1_category_id,l2_category,l2_category_id\nDairy & Breakfast,14,Milk,922\n",
    );
    config.output.database_path =
        Some(path_string(&dir.path().join("no_such_dir").join("runs.db")));

    let result = crawl(&config, "abc123").await;

    assert!(matches!(result, Err(ShelfError::Sink(_))));
    assert!(!Path::new(&config.output.csv_path).exists());
}

#[tokio::test]
async fn test_missing_csv_directory_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(vec![listing_item(1, "Milk")])),
        )
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = write_config(
        &dir,
        &server,
        "l1_category,l1_category_id,l2_category,l2_category_id\nDairy & Breakfast,14,Milk,922\n",
    );
    config.output.csv_path = path_string(&dir.path().join("no_such_dir").join("products.csv"));

    let result = crawl(&config, "abc123").await;

    assert!(matches!(result, Err(ShelfError::Sink(_))));
}
