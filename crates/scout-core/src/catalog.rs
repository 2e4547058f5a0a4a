// SPDX-License-Identifier: Apache-2.0

//! Project catalog.
//!
//! A single keyed table of the repositories Scout watches. The built-in list
//! is compiled into the binary; users add their own in
//! `~/.config/scout/projects.toml`:
//!
//! ```toml
//! [projects."rust-lang/rustlings"]
//! owner = "rust-lang"
//! name = "rustlings"
//! category = "Learning"
//! stars = 60000
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::config_dir;
use crate::error::ScoutError;

/// Embedded project list, sorted by stars descending.
const EMBEDDED_PROJECTS: &str = include_str!("../../../data/projects.json");

/// A watched repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Free-form grouping such as `Kubernetes` or `TLS/Security`.
    pub category: String,
    /// Approximate star count.
    pub stars: u32,
}

impl Project {
    /// Returns the full repository name in "owner/name" format.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Custom projects file structure.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CustomProjectsFile {
    /// Map of repository full names to project data.
    #[serde(default)]
    pub projects: HashMap<String, Project>,
}

/// Returns the path to the custom projects file.
#[must_use]
pub fn projects_file_path() -> PathBuf {
    config_dir().join("projects.toml")
}

/// Reads custom projects from a TOML file.
///
/// Returns an empty vector if the file does not exist.
///
/// # Errors
///
/// Returns `ScoutError::Config` if the file exists but is invalid TOML.
#[instrument]
pub fn read_custom_projects(path: &Path) -> Result<Vec<Project>, ScoutError> {
    if !path.exists() {
        debug!("Custom projects file does not exist: {:?}", path);
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|e| ScoutError::Config {
        message: format!("Failed to read custom projects file: {e}"),
    })?;

    let file: CustomProjectsFile = toml::from_str(&content).map_err(|e| ScoutError::Config {
        message: format!("Failed to parse custom projects TOML: {e}"),
    })?;

    let projects: Vec<Project> = file.projects.into_values().collect();
    debug!("Read {} custom projects", projects.len());
    Ok(projects)
}

/// Ordered, deduplicated set of projects.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    /// Builds a catalog, dropping later duplicates of `(owner, name)` and
    /// sorting by stars descending. Ties keep their input order.
    #[must_use]
    pub fn from_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let mut seen = HashSet::new();
        let mut projects: Vec<Project> = projects
            .into_iter()
            .filter(|p| seen.insert((p.owner.to_lowercase(), p.name.to_lowercase())))
            .collect();
        projects.sort_by(|a, b| b.stars.cmp(&a.stars));
        Self { projects }
    }

    /// The built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns `ScoutError::Config` if the embedded list cannot be parsed.
    pub fn embedded() -> Result<Self, ScoutError> {
        let projects: Vec<Project> =
            serde_json::from_str(EMBEDDED_PROJECTS).map_err(|e| ScoutError::Config {
                message: format!("Embedded project list is invalid: {e}"),
            })?;
        Ok(Self::from_projects(projects))
    }

    /// The built-in catalog plus the user's custom projects file.
    ///
    /// Built-in entries win over custom entries with the same identity.
    ///
    /// # Errors
    ///
    /// Returns `ScoutError::Config` if either list cannot be parsed.
    pub fn load() -> Result<Self, ScoutError> {
        Self::load_with_custom(&projects_file_path())
    }

    /// Like [`load`](Self::load) with an explicit custom file path.
    ///
    /// # Errors
    ///
    /// Returns `ScoutError::Config` if either list cannot be parsed.
    pub fn load_with_custom(path: &Path) -> Result<Self, ScoutError> {
        let embedded = Self::embedded()?;
        let custom = read_custom_projects(path)?;
        Ok(Self::from_projects(embedded.projects.into_iter().chain(custom)))
    }

    /// All projects, most starred first.
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Number of projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// True if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Projects whose category matches one of `categories`, ignoring case.
    /// An empty filter keeps everything.
    #[must_use]
    pub fn filter_categories(&self, categories: &[String]) -> Vec<Project> {
        if categories.is_empty() {
            return self.projects.clone();
        }
        let wanted: HashSet<String> = categories.iter().map(|c| c.to_lowercase()).collect();
        self.projects
            .iter()
            .filter(|p| wanted.contains(&p.category.to_lowercase()))
            .cloned()
            .collect()
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.projects
            .iter()
            .map(|p| p.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Star count of a project, looked up by `owner/name` or, for a bare
    /// name, the most starred project with that name. Case-insensitive.
    #[must_use]
    pub fn stars_for(&self, name: &str) -> Option<u32> {
        let matches = |p: &&Project| match name.split_once('/') {
            Some((owner, repo)) => {
                p.owner.eq_ignore_ascii_case(owner) && p.name.eq_ignore_ascii_case(repo)
            }
            None => p.name.eq_ignore_ascii_case(name),
        };
        self.projects.iter().find(matches).map(|p| p.stars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(owner: &str, name: &str, category: &str, stars: u32) -> Project {
        Project {
            owner: owner.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            stars,
        }
    }

    #[test]
    fn test_full_name_format() {
        assert_eq!(
            project("helm", "helm", "Kubernetes", 1).full_name(),
            "helm/helm"
        );
    }

    #[test]
    fn test_embedded_catalog_is_sorted_and_unique() {
        let catalog = Catalog::embedded().unwrap();
        assert!(!catalog.is_empty());
        assert!(
            catalog
                .projects()
                .windows(2)
                .all(|w| w[0].stars >= w[1].stars)
        );
        let identities: HashSet<_> = catalog.projects().iter().map(Project::full_name).collect();
        assert_eq!(identities.len(), catalog.len());
    }

    #[test]
    fn test_from_projects_drops_duplicates() {
        let catalog = Catalog::from_projects(vec![
            project("a", "x", "Go Core", 10),
            project("A", "X", "Other", 99),
            project("b", "y", "Go Core", 20),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.projects()[0].name, "y");
        assert_eq!(catalog.projects()[1].category, "Go Core");
    }

    #[test]
    fn test_filter_categories_case_insensitive() {
        let catalog = Catalog::from_projects(vec![
            project("a", "x", "Kubernetes", 10),
            project("b", "y", "Monitoring", 20),
        ]);
        let filtered = catalog.filter_categories(&["kubernetes".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "x");
        assert_eq!(catalog.filter_categories(&[]).len(), 2);
    }

    #[test]
    fn test_stars_for() {
        let catalog = Catalog::from_projects(vec![project("cilium", "cilium", "Kubernetes", 18000)]);
        assert_eq!(catalog.stars_for("Cilium"), Some(18000));
        assert_eq!(catalog.stars_for("missing"), None);
    }

    #[test]
    fn test_stars_for_full_name_separates_same_named_repos() {
        let catalog = Catalog::from_projects(vec![
            project("urfave", "cli", "Go Tools", 22000),
            project("tektoncd", "cli", "CI/CD", 400),
        ]);
        assert_eq!(catalog.stars_for("tektoncd/cli"), Some(400));
        assert_eq!(catalog.stars_for("URFAVE/CLI"), Some(22000));
        assert_eq!(catalog.stars_for("cli"), Some(22000));
        assert_eq!(catalog.stars_for("someone/cli"), None);
    }

    #[test]
    fn test_load_with_custom_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.toml");
        fs::write(
            &path,
            r#"
[projects."acme/widgets"]
owner = "acme"
name = "widgets"
category = "Tools"
stars = 12
"#,
        )
        .unwrap();

        let embedded = Catalog::embedded().unwrap();
        let catalog = Catalog::load_with_custom(&path).unwrap();
        assert_eq!(catalog.len(), embedded.len() + 1);
        assert_eq!(catalog.stars_for("widgets"), Some(12));
    }

    #[test]
    fn test_read_custom_projects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let projects = read_custom_projects(&dir.path().join("nope.toml")).unwrap();
        assert!(projects.is_empty());
    }

    #[test]
    fn test_read_custom_projects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.toml");
        fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            read_custom_projects(&path),
            Err(ScoutError::Config { .. })
        ));
    }
}
