use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub struct RelockConfig {
    pub snapshot_file: Option<PathBuf>,
    pub lock_file: Option<PathBuf>,
}

impl RelockConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(None)?;

        Ok(Self {
            snapshot_file: raw_config.snapshot.file,
            lock_file: raw_config.lock.file,
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    snapshot: SnapshotConfig,
    #[serde(default)]
    lock: LockConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct SnapshotConfig {
    file: Option<PathBuf>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct LockConfig {
    file: Option<PathBuf>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("RELOCK")
                    .separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_empty() {
        let env = HashMap::from([]);
        let config = RawConfig::load(Some(env)).unwrap();
        assert_eq!(
            config,
            RawConfig {
                snapshot: SnapshotConfig { file: None },
                lock: LockConfig { file: None }
            }
        )
    }

    #[test]
    fn load_environment() {
        let env = HashMap::from([
            ("RELOCK_SNAPSHOT_FILE".to_owned(), "build/relock.toml".to_owned()),
            ("RELOCK_LOCK_FILE".to_owned(), "deps.lockfile".to_owned()),
        ]);
        let config = RawConfig::load(Some(env)).unwrap();
        assert_eq!(
            config,
            RawConfig {
                snapshot: SnapshotConfig {
                    file: Some("build/relock.toml".into())
                },
                lock: LockConfig {
                    file: Some("deps.lockfile".into())
                }
            }
        )
    }
}
