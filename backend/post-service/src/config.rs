/// Configuration management for Post Service
///
/// This module handles loading and managing configuration from environment
/// variables (a `.env` file is loaded first by the binary).
use s3_utils::S3Config;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Which storage adapters to wire
    pub storage: StorageBackend,
    /// Record store (DynamoDB) configuration
    pub dynamodb: DynamoConfig,
    /// Object store (S3) configuration
    pub s3: S3Config,
    /// Upload limits
    pub uploads: UploadConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Number of HTTP workers
    pub workers: usize,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// DynamoDB + S3
    Aws,
    /// Process-local maps; state is lost on restart
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(StorageBackend::Aws),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!(
                "STORAGE_BACKEND must be 'aws' or 'memory', got '{}'",
                other
            )),
        }
    }
}

/// DynamoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamoConfig {
    /// Table holding post records, keyed by `id`
    pub table_name: String,
    /// AWS region
    pub region: String,
    /// Custom endpoint (DynamoDB Local, LocalStack)
    pub endpoint_url: Option<String>,
}

/// Upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum total bytes of file parts in one request
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let app = AppConfig {
            env: app_env,
            host: std::env::var("POST_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env_or_default("POST_SERVICE_PORT", 8080)?,
            workers: parse_env_or_default("POST_SERVICE_WORKERS", 4)?,
        };

        let storage = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Aws,
        };
        if app.is_production() && storage == StorageBackend::Memory {
            return Err("STORAGE_BACKEND=memory is not allowed in production".to_string());
        }

        let dynamodb = DynamoConfig {
            table_name: std::env::var("DYNAMODB_TABLE").unwrap_or_else(|_| "posts".to_string()),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint_url: std::env::var("DYNAMODB_ENDPOINT_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        };
        if dynamodb.table_name.trim().is_empty() {
            return Err("DYNAMODB_TABLE cannot be empty".to_string());
        }

        Ok(Config {
            app,
            storage,
            dynamodb,
            s3: S3Config::from_env()?,
            uploads: UploadConfig {
                max_upload_bytes: parse_env_or_default("MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            },
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
