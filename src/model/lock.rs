use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    str::FromStr,
    sync::OnceLock,
};

use log::trace;
use regex_lite::Regex;
use serde::Deserialize;

use crate::model::ParseError;

const COMMENT_PREFIX: &str = "# ";
const EMPTY_KEY: &str = "empty";

/// A concrete external artifact, `group:artifact:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Deserialize)]
#[serde(try_from = "String")]
pub struct DependencyCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl DependencyCoordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        DependencyCoordinate {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Lenient form used for lock file keys: any key with exactly three parts.
    fn from_lock_key(key: &str) -> Option<Self> {
        let parts = key.split(':').collect::<Vec<_>>();
        match parts.as_slice() {
            [group, artifact, version] => {
                Some(DependencyCoordinate::new(*group, *artifact, *version))
            }
            _ => None,
        }
    }
}

impl Display for DependencyCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl FromStr for DependencyCoordinate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(
                r"^(?P<group>[^:=,\s]+):(?P<artifact>[^:=,\s]+):(?P<version>[^:=,\s]+)$",
            )
            .unwrap()
        });
        let captures = re
            .captures(s)
            .ok_or_else(|| ParseError::InvalidCoordinate(s.to_string()))?;

        Ok(DependencyCoordinate::new(
            &captures["group"],
            &captures["artifact"],
            &captures["version"],
        ))
    }
}

impl TryFrom<String> for DependencyCoordinate {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Name of a dependency configuration, e.g. `compileClasspath`.
#[derive(Clone, Hash, Deserialize, Debug, PartialEq, Eq, Ord, PartialOrd)]
pub struct ConfigurationName(String);

impl ConfigurationName {
    pub fn new(s: String) -> Self {
        ConfigurationName(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ConfigurationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ConfigurationName {
    fn from(s: String) -> Self {
        ConfigurationName(s)
    }
}

impl From<&str> for ConfigurationName {
    fn from(s: &str) -> Self {
        ConfigurationName(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEntry {
    pub coordinate: DependencyCoordinate,
    pub configurations: BTreeSet<ConfigurationName>,
}

impl LockEntry {
    /// `None` for an entry without configurations, those are never written.
    pub fn to_line(&self) -> Option<String> {
        if self.configurations.is_empty() {
            None
        } else {
            Some(format!(
                "{}={}",
                self.coordinate,
                join(&self.configurations)
            ))
        }
    }
}

/// In-memory form of a dependency lock file.
///
/// Comments keep their relative order. Entries and configuration names are
/// kept sorted, so rendering never depends on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockFile {
    pub comments: Vec<String>,
    pub locked: BTreeMap<DependencyCoordinate, BTreeSet<ConfigurationName>>,
    pub empty: BTreeSet<ConfigurationName>,
}

impl LockFile {
    /// Parses lock file text. Never fails: lines that are neither comments,
    /// coordinate entries nor the `empty=` sentinel are dropped.
    pub fn parse(text: &str) -> LockFile {
        let mut lock_file = LockFile::default();

        for line in text.split('\n') {
            if line.starts_with(COMMENT_PREFIX) {
                lock_file.comments.push(line.to_string());
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            let Some((key, configurations)) = split_entry(line) else {
                trace!("Ignoring malformed lock line {:?}", line);
                continue;
            };
            if key == EMPTY_KEY {
                lock_file.empty.extend(configurations);
            } else if let Some(coordinate) = DependencyCoordinate::from_lock_key(key) {
                lock_file
                    .locked
                    .entry(coordinate)
                    .or_default()
                    .extend(configurations);
            } else {
                trace!("Ignoring lock line with unrecognised key {:?}", line);
            }
        }

        lock_file
    }

    /// Every configuration name mentioned by an entry or by the `empty=` line.
    pub fn locked_configurations(&self) -> BTreeSet<&ConfigurationName> {
        self.locked
            .values()
            .flatten()
            .chain(self.empty.iter())
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = LockEntry> + '_ {
        self.locked
            .iter()
            .map(|(coordinate, configurations)| LockEntry {
                coordinate: coordinate.clone(),
                configurations: configurations.clone(),
            })
    }

    /// Canonical text: comments, a blank separator when entries follow,
    /// entries sorted by their rendered `group:artifact:version`, then the
    /// `empty=` sentinel.
    pub fn render(&self, trailing_newline: bool) -> String {
        let entries = self
            .entries()
            .filter_map(|entry| Some((entry.coordinate.to_string(), entry.to_line()?)))
            .collect::<BTreeMap<_, _>>();

        let mut lines = self.comments.clone();
        if !lines.is_empty() && !entries.is_empty() {
            lines.push(String::new());
        }
        lines.extend(entries.into_values());
        lines.push(format!("{}={}", EMPTY_KEY, join(&self.empty)));

        let mut text = lines.join("\n");
        if trailing_newline {
            text.push('\n');
        }
        text
    }
}

fn split_entry(line: &str) -> Option<(&str, BTreeSet<ConfigurationName>)> {
    let parts = line.split('=').collect::<Vec<_>>();
    let [key, configurations] = parts.as_slice() else {
        return None;
    };
    let configurations = configurations
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ConfigurationName::from)
        .collect();
    Some((*key, configurations))
}

fn join(configurations: &BTreeSet<ConfigurationName>) -> String {
    configurations
        .iter()
        .map(ConfigurationName::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
