use std::collections::BTreeSet;

use log::{debug, trace};

use crate::model::{
    lock::{ConfigurationName, LockFile},
    project::{ProjectModel, SiblingModules},
};

/// Outcome of reconciling one lock file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockUpdate {
    /// Rendering the reconciled lock reproduced the input exactly.
    Unchanged,
    /// Full replacement text for the lock file.
    Updated(String),
}

impl LockUpdate {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, LockUpdate::Unchanged)
    }
}

/// Reconciles the previous lock file text with the resolved state of the
/// project and returns the text that should replace it, if any.
pub fn update_lock(
    text: &str,
    project: &ProjectModel,
    siblings: &SiblingModules,
) -> LockUpdate {
    if text.trim().is_empty() {
        return LockUpdate::Unchanged;
    }

    let reconciled = reconcile(LockFile::parse(text), project, siblings);
    let rendered = reconciled.render(text.ends_with('\n'));

    if rendered == text {
        LockUpdate::Unchanged
    } else {
        LockUpdate::Updated(rendered)
    }
}

/// Merges a parsed lock file with the resolved configurations of `project`.
///
/// Only configurations that are resolvable and already tracked by the lock
/// file are recomputed. Lock data for every other configuration, including
/// its `empty=` marker, is carried over as is.
pub fn reconcile(previous: LockFile, project: &ProjectModel, siblings: &SiblingModules) -> LockFile {
    let is_recomputed = |name: &ConfigurationName| {
        project
            .configuration(name)
            .is_some_and(|configuration| configuration.resolvable)
    };

    let tracked = previous
        .locked_configurations()
        .into_iter()
        .cloned()
        .collect::<BTreeSet<_>>();

    let LockFile {
        comments,
        locked: previous_locked,
        empty: previous_empty,
    } = previous;

    let mut reconciled = LockFile {
        comments,
        ..LockFile::default()
    };

    for (coordinate, configurations) in previous_locked {
        let preserved = configurations
            .into_iter()
            .filter(|name| !is_recomputed(name))
            .collect::<BTreeSet<_>>();
        if !preserved.is_empty() {
            trace!("Preserving {} for {:?}", coordinate, preserved);
            reconciled
                .locked
                .entry(coordinate)
                .or_default()
                .extend(preserved);
        }
    }
    reconciled
        .empty
        .extend(previous_empty.into_iter().filter(|name| !is_recomputed(name)));

    for configuration in project
        .configurations
        .iter()
        .filter(|configuration| configuration.resolvable)
        .filter(|configuration| tracked.contains(&configuration.name))
    {
        let mut locked_any = false;
        for dependency in &configuration.dependencies {
            if siblings.is_sibling(dependency, &project.group) {
                trace!(
                    "Skipping {} in {}, it is a module of this build",
                    dependency.coordinate,
                    configuration.name
                );
                continue;
            }
            reconciled
                .locked
                .entry(dependency.coordinate.clone())
                .or_default()
                .insert(configuration.name.clone());
            locked_any = true;
        }
        if !locked_any {
            debug!(
                "Configuration {} of {} has no external dependencies",
                configuration.name, project.name
            );
            reconciled.empty.insert(configuration.name.clone());
        }
    }

    reconciled
}
