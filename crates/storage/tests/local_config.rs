use storage::local::{LocalFileStore, PROVIDER_CONFIG_KEY};
use storage::repository::Storage;
use study_core::model::ProviderConfigDraft;

#[tokio::test]
async fn provider_config_persists_as_flat_json_blob() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("study-local.json");
    let storage = Storage::local_file(&path);

    assert!(storage.config.get_config().await.unwrap().is_none());

    let config = ProviderConfigDraft {
        api_key: Some("key-123".into()),
        auth_domain: Some("demo.firebaseapp.com".into()),
        project_id: Some("demo".into()),
        storage_bucket: Some("demo.appspot.com".into()),
        messaging_sender_id: None,
        app_id: Some("1:42:web:abc".into()),
    }
    .validate()
    .unwrap();
    storage.config.save_config(&config).await.unwrap();

    let reopened = Storage::local_file(&path);
    let reloaded = reopened.config.get_config().await.unwrap();
    assert_eq!(reloaded.as_ref(), Some(&config));

    // The slot holds a JSON-encoded flat object with camelCase keys.
    let raw = LocalFileStore::new(&path)
        .get_item(PROVIDER_CONFIG_KEY)
        .await
        .unwrap()
        .expect("config slot");
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["projectId"], "demo");
    assert_eq!(value["storageBucket"], "demo.appspot.com");
    assert!(value.get("messagingSenderId").is_none());
}

#[tokio::test]
async fn invalid_stored_config_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("study-local.json");
    let store = LocalFileStore::new(&path);
    let bad = r#"{"storageBucket":"gs://nope"}"#;
    store
        .set_item(PROVIDER_CONFIG_KEY, bad.into())
        .await
        .unwrap();

    let storage = Storage::local_file(&path);
    assert!(storage.config.get_config().await.is_err());
}
