//! Datasource collection behaviour against the fake service.

mod common;

use common::TestEnv;
use minds_client::{Datasource, Error};
use serde_json::json;

#[tokio::test]
async fn test_create_then_get_returns_supplied_fields() {
    let env = TestEnv::start().await;
    let spec = Datasource::example()
        .with_name("sales")
        .with_tables(["orders", "customers"]);

    let created = env.client.datasources().create(&spec, false).await.unwrap();
    assert_eq!(created, spec);

    let fetched = env.client.datasources().get("sales").await.unwrap();
    assert_eq!(fetched, spec);
}

#[tokio::test]
async fn test_create_duplicate_without_replace_fails() {
    let env = TestEnv::start().await;
    let spec = Datasource::example();

    env.client.datasources().create(&spec, false).await.unwrap();
    let err = env.client.datasources().create(&spec, false).await.unwrap_err();

    assert!(err.is_already_exists(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_replace_discards_previous_version() {
    let env = TestEnv::start().await;
    let first = Datasource::new("warehouse", "postgres")
        .with_description("old warehouse")
        .with_connection_param("host", "old.internal")
        .with_connection_param("sslmode", "require")
        .with_tables(["legacy"]);
    env.client.datasources().create(&first, false).await.unwrap();

    let second = Datasource::new("warehouse", "snowflake")
        .with_connection_param("account", "acme");
    let replaced = env.client.datasources().create(&second, true).await.unwrap();

    assert_eq!(replaced, second);
    assert!(replaced.description.is_none());
    assert!(replaced.tables.is_empty());
    assert!(!replaced.connection_data.contains_key("sslmode"));
}

#[tokio::test]
async fn test_replace_on_fresh_name_creates() {
    let env = TestEnv::start().await;
    let spec = Datasource::example();

    let created = env.client.datasources().create(&spec, true).await.unwrap();
    assert_eq!(created.name, spec.name);
    assert_eq!(env.service.count("DELETE /api/datasources/example_ds"), 1);
}

#[tokio::test]
async fn test_drop_then_get_is_not_found() {
    let env = TestEnv::start().await;
    let api = env.client.datasources();
    api.create(&Datasource::example(), false).await.unwrap();

    api.drop("example_ds").await.unwrap();

    let err = api.get("example_ds").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("datasource 'example_ds'"));

    let err = api.drop("example_ds").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_drop_if_exists() {
    let env = TestEnv::start().await;
    let api = env.client.datasources();
    api.create(&Datasource::example(), false).await.unwrap();

    assert!(api.drop_if_exists("example_ds").await.unwrap());
    assert!(!api.drop_if_exists("example_ds").await.unwrap());
}

#[tokio::test]
async fn test_list_skips_entries_without_engine() {
    let env = TestEnv::start().await;
    env.service.seed_datasource(json!({
        "name": "files",
        "engine": null,
        "connection_data": null
    }));
    env.client
        .datasources()
        .create(&Datasource::example(), false)
        .await
        .unwrap();
    env.client
        .datasources()
        .create(&Datasource::example().with_name("second"), false)
        .await
        .unwrap();

    let listed = env.client.datasources().list().await.unwrap();
    let mut names: Vec<_> = listed.iter().map(|ds| ds.name.as_str()).collect();
    names.sort();

    assert_eq!(names, vec!["example_ds", "second"]);
}

#[tokio::test]
async fn test_list_empty() {
    let env = TestEnv::start().await;
    assert!(env.client.datasources().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_api_key_is_rejected() {
    let env = TestEnv::start().await;
    let client = env.client_with_key("api_key");

    let err = client.datasources().get("example_db").await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "unexpected error: {err}");
}
