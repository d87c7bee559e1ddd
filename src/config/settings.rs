use std::path::PathBuf;

use url::Url;

use crate::config::env::{ConfigError, EnvKey, EnvReader};

pub const DEFAULT_SEGMENTER_COMMAND: &str = "rembg i - -";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct S3Settings {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// Where the `uploads` and `processed` areas live.
#[derive(Clone, Debug)]
pub enum StorageSettings {
    Local {
        upload_dir: PathBuf,
        processed_dir: PathBuf,
    },
    S3(S3Settings),
    Memory,
}

#[derive(Clone, Debug)]
pub enum SegmenterSettings {
    /// External program reading the image on stdin and writing a PNG to stdout.
    Command { program: String, args: Vec<String> },
    /// Remote segmentation server accepting a multipart `file` upload.
    Http { url: Url },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub server_port: u16,
    pub storage: StorageSettings,
    pub segmenter: SegmenterSettings,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_env(&EnvReader::process())
    }

    pub fn from_env(env: &EnvReader<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: env.get_or(EnvKey::Host, "0.0.0.0"),
            server_port: env.get_parsed(EnvKey::ServerPort, 8000)?,
            storage: Self::storage_from_env(env)?,
            segmenter: Self::segmenter_from_env(env)?,
            cors_origins: split_list(&env.get_or(EnvKey::CorsOrigins, DEFAULT_CORS_ORIGINS)),
            max_upload_bytes: env.get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.server_port)
    }

    fn storage_from_env(env: &EnvReader<'_>) -> Result<StorageSettings, ConfigError> {
        let backend = env.get_or(EnvKey::StorageBackend, "local");
        match backend.to_ascii_lowercase().as_str() {
            "local" => Ok(StorageSettings::Local {
                upload_dir: env.get_or(EnvKey::UploadDir, "uploads").into(),
                processed_dir: env.get_or(EnvKey::ProcessedDir, "processed").into(),
            }),
            "s3" | "minio" => Ok(StorageSettings::S3(S3Settings {
                endpoint: env.get(EnvKey::MinioUrl)?,
                bucket: env.get(EnvKey::MinioBucket)?,
                access_key: env.get(EnvKey::MinioAccessKey)?,
                secret_key: env.get(EnvKey::MinioSecretKey)?,
                region: env.get_or(EnvKey::S3Region, "us-east-1"),
            })),
            "memory" => Ok(StorageSettings::Memory),
            _ => Err(ConfigError::invalid(
                EnvKey::StorageBackend,
                &backend,
                "expected one of local, s3, memory",
            )),
        }
    }

    fn segmenter_from_env(env: &EnvReader<'_>) -> Result<SegmenterSettings, ConfigError> {
        let kind = env.get_or(EnvKey::Segmenter, "command");
        match kind.to_ascii_lowercase().as_str() {
            "command" => {
                let line = env.get_or(EnvKey::SegmenterCommand, DEFAULT_SEGMENTER_COMMAND);
                let mut parts = line.split_whitespace().map(str::to_string);
                let program = parts.next().ok_or_else(|| {
                    ConfigError::invalid(EnvKey::SegmenterCommand, &line, "empty command")
                })?;
                Ok(SegmenterSettings::Command {
                    program,
                    args: parts.collect(),
                })
            }
            "http" => {
                let raw = env.get(EnvKey::SegmenterUrl)?;
                let url = Url::parse(&raw)
                    .map_err(|e| ConfigError::invalid(EnvKey::SegmenterUrl, &raw, e.to_string()))?;
                Ok(SegmenterSettings::Http { url })
            }
            _ => Err(ConfigError::invalid(
                EnvKey::Segmenter,
                &kind,
                "expected one of command, http",
            )),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            server_port: 8000,
            storage: StorageSettings::Memory,
            segmenter: SegmenterSettings::Command {
                program: "rembg".to_string(),
                args: vec!["i".to_string(), "-".to_string(), "-".to_string()],
            },
            cors_origins: split_list(DEFAULT_CORS_ORIGINS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
