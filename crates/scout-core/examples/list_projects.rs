// SPDX-License-Identifier: Apache-2.0

//! List catalog projects, optionally filtered by category.
//!
//! Run with: `cargo run --example list_projects -p scout-core -- Kubernetes`

use scout_core::list_projects;

fn main() -> anyhow::Result<()> {
    let categories: Vec<String> = std::env::args().skip(1).collect();
    let projects = list_projects(&categories)?;

    println!("Found {} projects:", projects.len());
    for project in &projects {
        println!(
            "  - {} ({}, {} stars)",
            project.full_name(),
            project.category,
            project.stars
        );
    }

    Ok(())
}
