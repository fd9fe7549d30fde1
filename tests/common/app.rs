use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use learning_progress::config::{Config, ProgressEnvConfig};
use learning_progress::progress::{ProgressConfig, ProgressEngine};
use learning_progress::routes::build_router;
use learning_progress::state::AppState;
use learning_progress::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<Store>,
    pub config: Config,
    _temp_dir: TempDir,
}

pub fn test_config(sled_path: String) -> Config {
    // Built directly so parallel tests never race on process env vars.
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        cors_origin: "http://localhost:5173".to_string(),
        progress: ProgressEnvConfig {
            trajectory_delta: 5.0,
            competence_threshold: 70.0,
            word_known_streak: 3,
            word_mastered_streak: 6,
            topic_count: 3,
        },
    }
}

/// Opens a migrated sled store in a fresh temp dir.
pub fn open_test_store() -> (TempDir, Arc<Store>) {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("progress-test.sled");
    let store = Arc::new(Store::open(&sled_path.to_string_lossy()).expect("open store"));
    store.run_migrations().expect("run migrations");
    (temp_dir, store)
}

pub async fn spawn_test_app() -> TestApp {
    let (temp_dir, store) = open_test_store();
    let sled_path = temp_dir.path().join("progress-test.sled");
    let config = test_config(sled_path.to_string_lossy().to_string());

    let engine = Arc::new(ProgressEngine::new(
        ProgressConfig::from_env(&config.progress),
        store.clone(),
    ));
    let state = AppState::new(store.clone(), engine, &config);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        store,
        config,
        _temp_dir: temp_dir,
    }
}
