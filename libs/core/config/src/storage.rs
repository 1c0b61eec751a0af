use crate::{env_or_default, ConfigError, FromEnv};
use std::path::{Path, PathBuf};

/// File storage layout for subscriber records and the street directory
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Directory holding one file per subscriber
    pub fn users_dir(&self) -> PathBuf {
        self.data_dir.join("users")
    }

    /// CSV file with the street directory
    pub fn streets_file(&self) -> PathBuf {
        self.data_dir.join("streets.csv")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl FromEnv for StorageConfig {
    /// DATA_DIR defaults to `data` relative to the working directory
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(env_or_default("DATA_DIR", "data")))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        temp_env::with_var_unset("DATA_DIR", || {
            let config = StorageConfig::from_env().unwrap();
            assert_eq!(config.data_dir, PathBuf::from("data"));
            assert_eq!(config.users_dir(), PathBuf::from("data/users"));
            assert_eq!(config.streets_file(), PathBuf::from("data/streets.csv"));
        });
    }

    #[test]
    fn test_storage_config_custom_dir() {
        temp_env::with_var("DATA_DIR", Some("/var/lib/outages"), || {
            let config = StorageConfig::from_env().unwrap();
            assert_eq!(config.users_dir(), PathBuf::from("/var/lib/outages/users"));
        });
    }
}
