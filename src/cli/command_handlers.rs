use log::{debug, info};
use thiserror::Error;
use tokio::task::JoinSet;

use crate::{
    api::LockMode,
    flock::FileLock,
    model::{
        project::{ProjectModel, SiblingModules, WorkspaceSnapshot},
        ParseError,
    },
    reconcile::{update_lock, LockUpdate},
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Error, Debug)]
pub enum LockError {
    #[error("Error while loading workspace snapshot: {0}")]
    Snapshot(#[from] ParseError),
    #[error("Lock file cannot be locked: {0}")]
    Lock(#[from] crate::flock::Error),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Module `{0}` is not part of the workspace snapshot")]
    UnknownModule(String),
    #[error("Lock file of module `{0}` does not exist at {1}")]
    MissingLockFile(String, PathBuf),
    #[error("Lock files are out of date for modules: {}", .0.join(", "))]
    OutOfDate(Vec<String>),
    #[error("Reconciliation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleOutcome {
    /// The module has no lock file, nothing was reconciled.
    Skipped,
    UpToDate,
    /// The lock file changed; it was rewritten unless running in locked mode.
    Updated,
}

/// Per-module outcomes of a lock run, ordered by module name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockReport {
    pub outcomes: BTreeMap<String, ModuleOutcome>,
}

impl LockReport {
    pub fn modules_with(&self, outcome: ModuleOutcome) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|(_, o)| **o == outcome)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Handler to lock command
/// Loads the workspace snapshot and reconciles the lock file of every module
/// concurrently. In locked mode nothing is written and stale lock files fail
/// the run.
pub async fn do_lock(
    lock_mode: LockMode,
    root: &Path,
    snapshot_file_name: &Path,
    lock_file_name: &Path,
) -> Result<LockReport, LockError> {
    let snapshot = WorkspaceSnapshot::from_file(&root.join(snapshot_file_name))?;
    let siblings = Arc::new(snapshot.siblings());

    let mut tasks = JoinSet::new();
    for project in snapshot.modules {
        let lock_file_path = root.join(project.directory()).join(lock_file_name);
        let siblings = Arc::clone(&siblings);
        tasks.spawn_blocking(move || {
            let outcome = lock_module(lock_mode, &project, &siblings, &lock_file_path);
            (project.name, outcome)
        });
    }

    let mut report = LockReport::default();
    while let Some(joined) = tasks.join_next().await {
        let (name, outcome) = joined?;
        report.outcomes.insert(name, outcome?);
    }

    if lock_mode == LockMode::Locked {
        let out_of_date = report.modules_with(ModuleOutcome::Updated);
        if !out_of_date.is_empty() {
            return Err(LockError::OutOfDate(out_of_date));
        }
    }

    Ok(report)
}

/// Handler to print command
/// Returns the reconciled lock file of one module without writing it.
pub fn do_print(
    root: &Path,
    snapshot_file_name: &Path,
    lock_file_name: &Path,
    module: &str,
) -> Result<String, LockError> {
    let snapshot = WorkspaceSnapshot::from_file(&root.join(snapshot_file_name))?;
    let project = snapshot
        .module(module)
        .ok_or_else(|| LockError::UnknownModule(module.to_string()))?;

    let lock_file_path = root.join(project.directory()).join(lock_file_name);
    if !lock_file_path.exists() {
        return Err(LockError::MissingLockFile(
            module.to_string(),
            lock_file_path,
        ));
    }
    let text = std::fs::read_to_string(&lock_file_path)?;

    match update_lock(&text, project, &snapshot.siblings()) {
        LockUpdate::Unchanged => Ok(text),
        LockUpdate::Updated(text) => Ok(text),
    }
}

fn lock_module(
    lock_mode: LockMode,
    project: &ProjectModel,
    siblings: &SiblingModules,
    lock_file_path: &Path,
) -> Result<ModuleOutcome, LockError> {
    if !lock_file_path.exists() {
        debug!(
            "Module {} has no lock file at {}, skipping",
            project.name,
            lock_file_path.display()
        );
        return Ok(ModuleOutcome::Skipped);
    }

    let mut lock = FileLock::new(lock_file_path)?;
    let text = lock.read_to_string()?;

    match update_lock(&text, project, siblings) {
        LockUpdate::Unchanged => {
            debug!("Lock file of {} is up to date", project.name);
            Ok(ModuleOutcome::UpToDate)
        }
        LockUpdate::Updated(text) if lock_mode == LockMode::Update => {
            lock.replace_contents(&text)?;
            info!("Wrote lock file to {}", lock_file_path.display());
            Ok(ModuleOutcome::Updated)
        }
        LockUpdate::Updated(_) => {
            info!("Lock file {} is out of date", lock_file_path.display());
            Ok(ModuleOutcome::Updated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    const SNAPSHOT: &str = "relock.toml";
    const LOCK_FILE: &str = "gradle.lockfile";

    /// Copies the sample workspace under `resources/workspace` into a
    /// temporary directory so tests can rewrite its lock files.
    fn sample_workspace() -> tempfile::TempDir {
        let source = project_root::get_project_root()
            .unwrap()
            .join("resources/workspace");
        let target = tempfile::tempdir().unwrap();
        for file in [SNAPSHOT, "app/gradle.lockfile", "core/gradle.lockfile"] {
            let destination = target.path().join(file);
            std::fs::create_dir_all(destination.parent().unwrap()).unwrap();
            std::fs::copy(source.join(file), destination).unwrap();
        }
        target
    }

    fn read(root: &Path, file: &str) -> String {
        std::fs::read_to_string(root.join(file)).unwrap()
    }

    #[tokio::test]
    async fn update_rewrites_stale_lock_files() {
        let workspace = sample_workspace();
        let root = workspace.path();
        let core_before = read(root, "core/gradle.lockfile");

        let report = do_lock(LockMode::Update, root, Path::new(SNAPSHOT), Path::new(LOCK_FILE))
            .await
            .unwrap();

        assert_eq!(
            report.outcomes,
            BTreeMap::from([
                ("app".to_string(), ModuleOutcome::Updated),
                ("core".to_string(), ModuleOutcome::UpToDate),
                ("testing".to_string(), ModuleOutcome::Skipped),
            ])
        );
        assert_eq!(
            read(root, "app/gradle.lockfile"),
            "# This is a Gradle generated file for dependency locking.\n\
             # Manual edits can break the build and are not advised.\n\
             # This file is expected to be part of source control.\n\
             \n\
             com.google.guava:failureaccess:1.0.1=compileClasspath,runtimeClasspath\n\
             com.google.guava:guava:32.1.2-jre=compileClasspath,runtimeClasspath\n\
             io.micronaut:micronaut-core:3.9.0=kapt\n\
             junit:junit:4.13.2=testRuntimeClasspath\n\
             org.slf4j:slf4j-api:2.0.7=runtimeClasspath\n\
             empty=annotationProcessor,testCompileClasspath\n"
        );
        assert_eq!(read(root, "core/gradle.lockfile"), core_before);

        let rerun = do_lock(LockMode::Locked, root, Path::new(SNAPSHOT), Path::new(LOCK_FILE))
            .await
            .unwrap();
        assert!(rerun.modules_with(ModuleOutcome::Updated).is_empty());
    }

    #[tokio::test]
    async fn locked_mode_reports_stale_lock_files() {
        let workspace = sample_workspace();
        let root = workspace.path();
        let app_before = read(root, "app/gradle.lockfile");

        let result =
            do_lock(LockMode::Locked, root, Path::new(SNAPSHOT), Path::new(LOCK_FILE)).await;

        assert!(matches!(
            result,
            Err(LockError::OutOfDate(modules)) if modules == vec!["app".to_string()]
        ));
        assert_eq!(read(root, "app/gradle.lockfile"), app_before);
    }

    #[test]
    fn print_does_not_write() {
        let workspace = sample_workspace();
        let root = workspace.path();
        let app_before = read(root, "app/gradle.lockfile");

        let printed = do_print(root, Path::new(SNAPSHOT), Path::new(LOCK_FILE), "app").unwrap();

        assert!(printed.contains("com.google.guava:guava:32.1.2-jre="));
        assert_eq!(read(root, "app/gradle.lockfile"), app_before);
        assert!(matches!(
            do_print(root, Path::new(SNAPSHOT), Path::new(LOCK_FILE), "nope"),
            Err(LockError::UnknownModule(_))
        ));
        assert!(matches!(
            do_print(root, Path::new(SNAPSHOT), Path::new(LOCK_FILE), "testing"),
            Err(LockError::MissingLockFile(..))
        ));
    }
}
