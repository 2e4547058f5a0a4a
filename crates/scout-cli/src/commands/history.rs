// SPDX-License-Identifier: Apache-2.0

//! Discovery history command.

use anyhow::Result;
use scout_core::{Catalog, HistoryRecord, top_history};

use super::types::{HistoryEntry, HistoryResult};

/// The `limit` best issues recorded so far.
pub async fn run(limit: usize) -> Result<HistoryResult> {
    let records = top_history(limit).await?;
    Ok(annotate(&Catalog::load()?, records))
}

fn annotate(catalog: &Catalog, records: Vec<HistoryRecord>) -> HistoryResult {
    let records = records
        .into_iter()
        .map(|record| HistoryEntry {
            stars: catalog.stars_for(&record.project),
            record,
        })
        .collect();
    HistoryResult { records }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use scout_core::Project;

    use super::*;

    fn record(project: &str) -> HistoryRecord {
        HistoryRecord {
            id: format!("{project}/1"),
            title: "Crash on start".to_string(),
            url: format!("https://github.com/{project}/issues/1"),
            project: project.to_string(),
            category: "Go Tools".to_string(),
            score: 0.8,
            comments: 0,
            labels: Vec::new(),
            created_at: Utc::now(),
            discovered_at: Utc::now(),
        }
    }

    #[test]
    fn test_annotate_uses_owner_qualified_stars() {
        let catalog = Catalog::from_projects(vec![
            Project {
                owner: "urfave".to_string(),
                name: "cli".to_string(),
                category: "Go Tools".to_string(),
                stars: 22000,
            },
            Project {
                owner: "tektoncd".to_string(),
                name: "cli".to_string(),
                category: "CI/CD".to_string(),
                stars: 400,
            },
        ]);

        let result = annotate(
            &catalog,
            vec![record("tektoncd/cli"), record("gone/away")],
        );
        assert_eq!(result.records[0].stars, Some(400));
        assert_eq!(result.records[1].stars, None);
    }
}
