// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};

use console::style;

use super::Renderable;
use crate::cli::OutputContext;
use crate::commands::types::RateLimitResult;

impl Renderable for RateLimitResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        let message = self.status.message();
        if self.low {
            writeln!(w, "{} {}", style("!").yellow().bold(), style(message).yellow())
        } else {
            writeln!(w, "{} {}", style("*").green().bold(), message)
        }
    }
}
