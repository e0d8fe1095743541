use std::{
    collections::{BTreeSet, HashSet},
    path::{Path, PathBuf},
};

use log::{debug, error};
use serde::Deserialize;

use crate::model::{
    lock::{ConfigurationName, DependencyCoordinate},
    ParseError,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ResolvedDependency {
    pub coordinate: DependencyCoordinate,
}

impl ResolvedDependency {
    pub fn new(coordinate: DependencyCoordinate) -> Self {
        ResolvedDependency { coordinate }
    }

    pub fn group(&self) -> &str {
        &self.coordinate.group
    }

    pub fn artifact(&self) -> &str {
        &self.coordinate.artifact
    }
}

/// One dependency configuration as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigurationModel {
    pub name: ConfigurationName,
    #[serde(default = "resolvable_by_default")]
    pub resolvable: bool,
    /// Transitively resolved dependencies, in resolver order.
    #[serde(default)]
    pub dependencies: Vec<ResolvedDependency>,
}

fn resolvable_by_default() -> bool {
    true
}

/// Resolved state of a single module of the build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectModel {
    pub name: String,
    pub group: String,
    /// Directory holding the module's lock file, relative to the workspace root.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub configurations: Vec<ConfigurationModel>,
}

impl ProjectModel {
    pub fn configuration(&self, name: &ConfigurationName) -> Option<&ConfigurationModel> {
        self.configurations
            .iter()
            .find(|configuration| &configuration.name == name)
    }

    pub fn directory(&self) -> &Path {
        self.path
            .as_deref()
            .unwrap_or_else(|| Path::new(&self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct SiblingModule {
    pub group: String,
    pub name: String,
}

impl SiblingModule {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        SiblingModule {
            group: group.into(),
            name: name.into(),
        }
    }
}

/// Other modules of the same multi-module build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiblingModules {
    modules: BTreeSet<SiblingModule>,
}

impl SiblingModules {
    pub fn new(modules: BTreeSet<SiblingModule>) -> Self {
        SiblingModules { modules }
    }

    pub fn contains(&self, group: &str, name: &str) -> bool {
        self.modules
            .iter()
            .any(|module| module.group == group && module.name == name)
    }

    /// A dependency points at a sibling when it shares the project's group
    /// and names one of the build's modules.
    pub fn is_sibling(&self, dependency: &ResolvedDependency, project_group: &str) -> bool {
        dependency.group() == project_group
            && self.contains(dependency.group(), dependency.artifact())
    }
}

impl FromIterator<SiblingModule> for SiblingModules {
    fn from_iter<T: IntoIterator<Item = SiblingModule>>(iter: T) -> Self {
        SiblingModules::new(iter.into_iter().collect())
    }
}

/// Resolver output for a whole build, as stored in the snapshot toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub modules: Vec<ProjectModel>,
}

impl WorkspaceSnapshot {
    pub fn from_file(path: &Path) -> Result<WorkspaceSnapshot, ParseError> {
        debug!("Attempting to read workspace snapshot {}", path.display());
        let contents = std::fs::read_to_string(path)?;

        let snapshot = WorkspaceSnapshot::from_toml_str(&contents);
        if let Err(err) = &snapshot {
            error!("Could not load workspace snapshot {} due to err {err}", path.display())
        }
        snapshot
    }

    pub fn from_toml_str(data: &str) -> Result<WorkspaceSnapshot, ParseError> {
        let snapshot = toml::from_str::<WorkspaceSnapshot>(data)?;

        let mut seen = HashSet::new();
        for module in &snapshot.modules {
            if !seen.insert(module.name.as_str()) {
                return Err(ParseError::DuplicateModule(module.name.clone()));
            }
            let mut configurations = HashSet::new();
            for configuration in &module.configurations {
                if !configurations.insert(&configuration.name) {
                    return Err(ParseError::DuplicateConfiguration(
                        module.name.clone(),
                        configuration.name.to_string(),
                    ));
                }
            }
        }

        Ok(snapshot)
    }

    pub fn siblings(&self) -> SiblingModules {
        self.modules
            .iter()
            .map(|module| SiblingModule::new(&module.group, &module.name))
            .collect()
    }

    pub fn module(&self, name: &str) -> Option<&ProjectModel> {
        self.modules.iter().find(|module| module.name == name)
    }
}
