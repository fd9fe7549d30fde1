use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub progress: ProgressEnvConfig,
}

/// Engine tunables that can be overridden per deployment.
#[derive(Debug, Clone)]
pub struct ProgressEnvConfig {
    pub trajectory_delta: f64,
    pub competence_threshold: f64,
    pub word_known_streak: u32,
    pub word_mastered_streak: u32,
    pub topic_count: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/progress.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            progress: ProgressEnvConfig {
                trajectory_delta: env_or_parse("PROGRESS_TRAJECTORY_DELTA", 5.0_f64),
                competence_threshold: env_or_parse("PROGRESS_COMPETENCE_THRESHOLD", 70.0_f64),
                word_known_streak: env_or_parse("PROGRESS_WORD_KNOWN_STREAK", 3_u32),
                word_mastered_streak: env_or_parse("PROGRESS_WORD_MASTERED_STREAK", 6_u32),
                topic_count: env_or_parse("PROGRESS_TOPIC_COUNT", 3_usize),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
