// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};

use console::style;

use super::Renderable;
use crate::cli::OutputContext;
use crate::commands::types::ProjectsResult;

impl Renderable for ProjectsResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.projects.is_empty() {
            writeln!(w, "{}", style("No projects match.").yellow())?;
            return Ok(());
        }

        writeln!(w)?;
        writeln!(
            w,
            "{}",
            style(format!("{} projects:", self.projects.len())).bold()
        )?;
        writeln!(w)?;

        for (i, project) in self.projects.iter().enumerate() {
            writeln!(
                w,
                "  {} {} {} {}",
                style(format!("{:>3}.", i + 1)).dim(),
                style(format!("{:<40}", project.full_name())).cyan(),
                style(format!("{:<14}", project.category)).yellow(),
                style(format!("{:>7} stars", project.stars)).dim()
            )?;
        }

        writeln!(w)?;
        Ok(())
    }
}
