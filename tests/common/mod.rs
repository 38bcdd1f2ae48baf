#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use word_recite_backend::db::config::DbConfig;
use word_recite_backend::db::DatabaseProxy;
use word_recite_backend::review::SchedulePolicy;

/// Keeps the temporary directory alive for as long as the database is used.
pub struct TestDb {
    pub proxy: Arc<DatabaseProxy>,
    _dir: TempDir,
}

pub async fn create_test_db() -> TestDb {
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = DbConfig::for_path(&dir.path().join("recite.db"));
    let proxy = DatabaseProxy::connect(config)
        .await
        .expect("failed to open test database");
    TestDb { proxy, _dir: dir }
}

pub async fn create_test_app() -> (Router, TestDb) {
    let db = create_test_db().await;
    let app = word_recite_backend::app_with_proxy(Arc::clone(&db.proxy), SchedulePolicy::default());
    (app, db)
}
