// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};

use chrono::Utc;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use console::style;

use super::{Renderable, age, truncate};
use crate::cli::OutputContext;
use crate::commands::types::HistoryResult;

impl Renderable for HistoryResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.records.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", style("No issues discovered yet.").yellow())?;
            writeln!(w, "Run `scout find` to get started!")?;
            writeln!(w)?;
            return Ok(());
        }

        let now = Utc::now();
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Score", "Issue", "Stars", "Title", "Found"]);

        for entry in &self.records {
            let record = &entry.record;
            let stars = entry.stars.map_or_else(|| "-".to_string(), |s| s.to_string());
            table.add_row(vec![
                Cell::new(format!("{:.2}", record.score)).set_alignment(CellAlignment::Right),
                Cell::new(&record.id),
                Cell::new(stars).set_alignment(CellAlignment::Right),
                Cell::new(truncate(&record.title, 60)),
                Cell::new(format!("{} ago", age(record.discovered_at, now))),
            ]);
        }

        writeln!(w)?;
        writeln!(w, "{table}")?;
        writeln!(w)?;
        Ok(())
    }
}
