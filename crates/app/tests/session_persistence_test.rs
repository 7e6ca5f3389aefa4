//! Integration tests for the durable session.
//!
//! These tests verify that tokens written through the session state land in
//! the session file and survive a restart of the client.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use agrisky_application::SessionState;
use agrisky_application::ports::SessionStorage;
use agrisky_domain::{RefreshedToken, TokenPair};
use agrisky_infrastructure::{ClientConfig, FileSessionStorage};

fn pair(access: &str, refresh: &str) -> TokenPair {
    TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
    }
}

#[tokio::test]
async fn test_login_persists_both_tokens() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("session.json");
    let storage = Arc::new(FileSessionStorage::new(&path));

    let session = SessionState::load(storage.clone()).await.unwrap();
    assert!(!session.is_authenticated().await);

    session.on_login(&pair("A1", "R1")).await.unwrap();

    assert_eq!(
        storage.get("access_token").await.unwrap(),
        Some("A1".to_string())
    );
    assert_eq!(
        storage.get("refresh_token").await.unwrap(),
        Some("R1".to_string())
    );
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"access_token\": \"A1\""));
}

#[tokio::test]
async fn test_session_survives_restart() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("session.json");

    {
        let session = SessionState::load(Arc::new(FileSessionStorage::new(&path)))
            .await
            .unwrap();
        session.on_login(&pair("A1", "R1")).await.unwrap();
        session
            .on_refreshed(&RefreshedToken {
                access_token: "A2".to_string(),
                refresh_token: None,
            })
            .await
            .unwrap();
    }

    let restored = SessionState::load(Arc::new(FileSessionStorage::new(&path)))
        .await
        .unwrap();

    assert!(restored.is_authenticated().await);
    assert_eq!(restored.current_access_token().await, Some("A2".to_string()));
    assert_eq!(restored.current_refresh_token().await, Some("R1".to_string()));
}

#[tokio::test]
async fn test_clear_removes_durable_entries() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("session.json");
    let storage = Arc::new(FileSessionStorage::new(&path));

    let session = SessionState::load(storage.clone()).await.unwrap();
    session.on_login(&pair("A1", "R1")).await.unwrap();
    session.clear().await.unwrap();

    assert_eq!(session.current_access_token().await, None);
    assert_eq!(storage.get("access_token").await.unwrap(), None);
    assert_eq!(storage.get("refresh_token").await.unwrap(), None);

    let restored = SessionState::load(Arc::new(FileSessionStorage::new(&path)))
        .await
        .unwrap();
    assert!(!restored.is_authenticated().await);
}

#[test]
fn test_session_file_lives_in_storage_dir() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = ClientConfig {
        storage_dir: Some(temp_dir.path().to_path_buf()),
        ..ClientConfig::default()
    };

    assert_eq!(
        config.session_file().unwrap(),
        temp_dir.path().join("session.json")
    );
}
