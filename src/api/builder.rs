use std::{env, path::PathBuf};

use crate::Relock;

#[derive(Default)]
pub struct RelockBuilder {
    // All other paths are relative to `root`
    root: Option<PathBuf>,
    snapshot_file_name: Option<PathBuf>,
    lock_file_name: Option<PathBuf>,
}

impl RelockBuilder {
    /// Workspace root directory.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Name of the workspace snapshot toml written by the dependency resolver.
    ///
    /// Defaults to `relock.toml`.
    pub fn snapshot_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_file_name = Some(path.into());
        self
    }

    /// Name of the lock file inside each module directory.
    ///
    /// Defaults to `gradle.lockfile`.
    pub fn lock_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_file_name = Some(path.into());
        self
    }

    pub fn try_build(self) -> Result<Relock, std::io::Error> {
        let Self {
            root,
            snapshot_file_name,
            lock_file_name,
        } = self;
        let root = match root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let snapshot_file_name =
            snapshot_file_name.unwrap_or_else(|| PathBuf::from("relock.toml"));

        let lock_file_name = lock_file_name.unwrap_or_else(|| PathBuf::from("gradle.lockfile"));

        Ok(Relock {
            root,
            snapshot_file_name,
            lock_file_name,
        })
    }
}
