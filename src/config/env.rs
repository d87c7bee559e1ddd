use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKey {
    Host,
    ServerPort,
    StorageBackend,
    UploadDir,
    ProcessedDir,
    MinioUrl,
    MinioBucket,
    MinioAccessKey,
    MinioSecretKey,
    S3Region,
    Segmenter,
    SegmenterCommand,
    SegmenterUrl,
    CorsOrigins,
    MaxUploadBytes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::Host => "APP_HOST",
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::StorageBackend => "STORAGE_BACKEND",
            EnvKey::UploadDir => "UPLOAD_DIR",
            EnvKey::ProcessedDir => "PROCESSED_DIR",
            EnvKey::MinioUrl => "MINIO_ENDPOINT",
            EnvKey::MinioBucket => "MINIO_BUCKET",
            EnvKey::MinioAccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::MinioSecretKey => "AWS_SECRET_ACCESS_KEY",
            EnvKey::S3Region => "S3_REGION",
            EnvKey::Segmenter => "SEGMENTER",
            EnvKey::SegmenterCommand => "SEGMENTER_COMMAND",
            EnvKey::SegmenterUrl => "SEGMENTER_URL",
            EnvKey::CorsOrigins => "CORS_ORIGINS",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(key: EnvKey, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.as_str(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Reads configuration values by [`EnvKey`].
///
/// The process environment is the normal source; tests plug in a closure.
pub struct EnvReader<'a> {
    lookup: Box<dyn Fn(&str) -> Option<String> + 'a>,
}

impl EnvReader<'static> {
    pub fn process() -> Self {
        Self {
            lookup: Box::new(|key| env::var(key).ok()),
        }
    }
}

impl<'a> EnvReader<'a> {
    pub fn from_fn(lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Blank values count as unset.
    pub fn lookup(&self, key: EnvKey) -> Option<String> {
        (self.lookup)(key.as_str())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn get(&self, key: EnvKey) -> Result<String, ConfigError> {
        self.lookup(key).ok_or(ConfigError::Missing(key.as_str()))
    }

    pub fn get_or(&self, key: EnvKey, default: &str) -> String {
        self.lookup(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_parsed<T>(&self, key: EnvKey, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.lookup(key) {
            Some(val) => val
                .parse::<T>()
                .map_err(|e| ConfigError::invalid(key, &val, e.to_string())),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_fall_back_to_default() {
        let reader = EnvReader::from_fn(|key| (key == "APP_PORT").then(|| "  ".to_string()));
        assert_eq!(reader.get_parsed(EnvKey::ServerPort, 8000u16).unwrap(), 8000);
        assert!(matches!(
            reader.get(EnvKey::ServerPort),
            Err(ConfigError::Missing("APP_PORT"))
        ));
    }

    #[test]
    fn unparsable_values_are_rejected() {
        let reader = EnvReader::from_fn(|key| (key == "APP_PORT").then(|| "eighty".to_string()));
        let err = reader.get_parsed(EnvKey::ServerPort, 8000u16).unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
