// SPDX-License-Identifier: Apache-2.0

//! List catalog projects.

use anyhow::Result;
use scout_core::list_projects;

use super::types::ProjectsResult;

/// Catalog projects in `categories` (all when empty).
pub fn run(categories: &[String]) -> Result<ProjectsResult> {
    Ok(ProjectsResult {
        projects: list_projects(categories)?,
    })
}
