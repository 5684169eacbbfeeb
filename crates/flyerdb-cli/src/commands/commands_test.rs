use super::*;

use std::path::PathBuf;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flyerdb_core::stores::StoreConfig;
use flyerdb_core::{Environment, StorePromotionsDoc};

fn scratch_root(tag: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("flyerdb-cli-{tag}-{}", std::process::id()));
    if root.exists() {
        std::fs::remove_dir_all(&root).expect("failed to clear scratch dir");
    }
    root
}

fn test_stores(names: &[&str]) -> StoresFile {
    StoresFile {
        stores: names
            .iter()
            .map(|name| StoreConfig {
                name: (*name).to_string(),
                notes: None,
            })
            .collect(),
        exclude_keys: Vec::new(),
    }
}

fn test_app_config(root: &Path) -> AppConfig {
    AppConfig {
        database_url: String::new(),
        env: Environment::Test,
        bind_addr: "0.0.0.0:3000".parse().expect("socket addr"),
        log_level: "info".to_string(),
        stores_path: root.join("stores.yaml"),
        openai_api_key: "sk-test".to_string(),
        openai_base_url: "http://localhost:9".to_string(),
        render_url: "http://localhost:9".to_string(),
        render_token: None,
        flyer_index_url: "http://localhost:9/flyers".to_string(),
        image_dir: root.join("images"),
        artifacts_dir: root.join("artifacts"),
        pages_per_store: 2,
        download_timeout_secs: 5,
        render_timeout_secs: 5,
        ai_timeout_secs: 5,
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
    }
}

fn promo(item: &str, price: f64, store: &str) -> Promotion {
    Promotion {
        item: item.to_string(),
        price,
        unit: "each".to_string(),
        discount: String::new(),
        store: store.to_string(),
    }
}

fn write_store_doc(artifacts_dir: &Path, store_key: &str, promotions: Vec<Promotion>) {
    std::fs::create_dir_all(artifacts_dir).expect("create artifacts dir");
    let doc = StorePromotionsDoc {
        store: store_key.replace('-', " "),
        store_key: store_key.to_string(),
        page_count: 1,
        total_pages: 1,
        promotion_count: promotions.len(),
        promotions,
    };
    std::fs::write(
        artifacts_dir.join(format!("{store_key}_promotions.json")),
        serde_json::to_string(&doc).expect("encode doc"),
    )
    .expect("write doc");
}

#[test]
fn filter_stores_keeps_only_the_requested_store() {
    let stores = test_stores(&["Metro", "No Frills", "IGA Extra"]);

    let filtered = filter_stores(stores, "no-frills").expect("known key");
    assert_eq!(filtered.stores.len(), 1);
    assert_eq!(filtered.stores[0].name, "No Frills");
}

#[test]
fn filter_stores_unknown_key_is_an_error() {
    let stores = test_stores(&["Metro"]);

    let err = filter_stores(stores, "walmart").expect_err("unknown key");
    let msg = format!("{err}");
    assert!(
        msg.contains("walmart"),
        "error should name the unknown key, got: {msg}"
    );
}

#[test]
fn build_deps_constructs_clients_from_config() {
    let root = scratch_root("build-deps");
    let config = test_app_config(&root);

    assert!(build_deps(&config).is_ok());
}

#[test]
fn count_by_store_sorts_and_counts() {
    let promotions = vec![
        promo("Eggs", 2.99, "metro"),
        promo("Milk", 4.49, "iga"),
        promo("Bread", 3.29, "metro"),
    ];

    let counts = count_by_store(&promotions);
    let entries: Vec<(String, usize)> = counts.into_iter().collect();
    assert_eq!(
        entries,
        vec![("iga".to_string(), 1), ("metro".to_string(), 2)]
    );
}

#[tokio::test]
async fn dry_run_renders_the_index_and_writes_nothing() {
    let server = MockServer::start().await;
    let root = scratch_root("dry-run");
    std::fs::create_dir_all(&root).expect("create root");
    std::fs::write(root.join("stores.yaml"), "stores:\n  - name: Metro\n").expect("write stores");

    let mut config = test_app_config(&root);
    config.render_url = server.uri();
    config.flyer_index_url = format!("{}/flyers/grocery", server.uri());

    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="flyer_listing" data-dealer-name="Metro">
                 <a class="flyer_image" href="/flyers/metro"></a>
               </div>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    run_scrape_dry_run(&config, None).await.expect("dry run");

    assert!(!config.image_dir.exists(), "dry run must not download pages");
    assert!(
        !config.artifacts_dir.exists(),
        "dry run must not write artifacts"
    );
}

#[tokio::test]
async fn dry_run_rejects_a_store_outside_the_allowlist() {
    let root = scratch_root("dry-run-filter");
    std::fs::create_dir_all(&root).expect("create root");
    std::fs::write(root.join("stores.yaml"), "stores:\n  - name: Metro\n").expect("write stores");

    let config = test_app_config(&root);
    let err = run_scrape_dry_run(&config, Some("walmart"))
        .await
        .expect_err("unknown store key");
    assert!(format!("{err}").contains("walmart"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn import_ingests_artifact_documents(pool: sqlx::PgPool) {
    let root = scratch_root("import");
    let artifacts = root.join("artifacts");
    write_store_doc(
        &artifacts,
        "iga",
        vec![promo("Eggs", 2.99, "iga"), promo("Milk", 4.49, "iga")],
    );
    write_store_doc(&artifacts, "metro", vec![promo("Bread", 3.29, "metro")]);

    run_import(&pool, &artifacts).await.expect("import");

    let scrape = flyerdb_db::latest_scrape(&pool)
        .await
        .expect("latest scrape query")
        .expect("scrape row");
    assert_eq!(scrape.promotion_count, 3);

    let promotions = flyerdb_db::query_current_promotions(&pool)
        .await
        .expect("promotions query")
        .expect("promotion set");
    assert_eq!(promotions.len(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn import_with_no_artifacts_leaves_db_untouched(pool: sqlx::PgPool) {
    let root = scratch_root("import-empty");
    let artifacts = root.join("artifacts");
    std::fs::create_dir_all(&artifacts).expect("create artifacts dir");

    run_import(&pool, &artifacts).await.expect("import");

    let scrape = flyerdb_db::latest_scrape(&pool)
        .await
        .expect("latest scrape query");
    assert!(scrape.is_none(), "no scrape row should have been created");
}

#[sqlx::test(migrations = "../../migrations")]
async fn promotions_command_handles_an_empty_database(pool: sqlx::PgPool) {
    let root = scratch_root("promotions-empty");
    let config = test_app_config(&root);

    run_promotions(&pool, &config)
        .await
        .expect("promotions command");
}
