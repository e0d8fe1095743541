use std::path::PathBuf;

use crate::cli::command_handlers::{do_lock, do_print, LockError, LockReport};

mod builder;

pub use builder::RelockBuilder;

pub struct Relock {
    root: PathBuf,
    snapshot_file_name: PathBuf,
    lock_file_name: PathBuf,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LockMode {
    /// Verify that every lock file is up to date. This mode should be normally used on CI.
    Locked,
    /// Rewrite lock files that are out of date.
    Update,
}

impl Relock {
    pub fn builder() -> RelockBuilder {
        RelockBuilder::default()
    }

    /// Reconciles the lock file of every module in the workspace snapshot
    pub async fn lock(&self, lock_mode: LockMode) -> Result<LockReport, LockError> {
        do_lock(
            lock_mode,
            &self.root,
            &self.snapshot_file_name,
            &self.lock_file_name,
        )
        .await
    }

    /// Renders the reconciled lock file of a single module without writing it
    pub fn print(&self, module: &str) -> Result<String, LockError> {
        do_print(
            &self.root,
            &self.snapshot_file_name,
            &self.lock_file_name,
            module,
        )
    }
}
