// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};

use chrono::Utc;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

use super::{Renderable, age, truncate};
use crate::cli::OutputContext;
use crate::commands::types::FindResult;

impl Renderable for FindResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        if self.issues.is_empty() {
            writeln!(w, "{}", style("No new issues found.").yellow())?;
        } else {
            let now = Utc::now();
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Score", "Project", "Issue", "Title", "Age", "Comments"]);

            for issue in &self.issues {
                let score = Cell::new(format!("{:.2}", issue.score))
                    .set_alignment(CellAlignment::Right)
                    .fg(if issue.is_entry_level {
                        Color::Green
                    } else {
                        Color::Reset
                    });
                table.add_row(vec![
                    score,
                    Cell::new(issue.project.full_name()).fg(Color::Cyan),
                    Cell::new(format!("#{}", issue.number)),
                    Cell::new(truncate(&issue.title, 60)),
                    Cell::new(age(issue.created_at, now)),
                    Cell::new(issue.comments).set_alignment(CellAlignment::Right),
                ]);
            }
            writeln!(w, "{table}")?;
            writeln!(w)?;
            for issue in &self.issues {
                writeln!(w, "  {}", style(&issue.url).dim())?;
            }
        }

        writeln!(w)?;
        writeln!(
            w,
            "{}",
            style(format!(
                "Scanned {} projects ({} failed), skipped {} already-seen issues.",
                self.projects_scanned, self.projects_failed, self.issues_seen
            ))
            .dim()
        )?;
        if self.cancelled {
            writeln!(w, "{}", style("Scan interrupted; results are partial.").yellow())?;
        }
        Ok(())
    }
}
