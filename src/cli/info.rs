//! Info command implementations (groups)

use serde::Serialize;
use std::process::ExitCode;

use crate::build::{effective_group_size, group_sizes};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Layout of aggregate files for a given source count.
#[derive(Debug, Serialize)]
struct GroupLayout {
    total: usize,
    max_sources: usize,
    min_files: usize,
    group_size: usize,
    sizes: Vec<usize>,
}

impl GroupLayout {
    fn new(total: usize, max_sources: usize, min_files: usize) -> Self {
        Self {
            total,
            max_sources,
            min_files,
            group_size: effective_group_size(total, max_sources, min_files),
            sizes: group_sizes(total, max_sources, min_files),
        }
    }
}

/// Execute the groups command
pub fn run_groups(total: usize, max_sources: usize, min_files: usize, json: bool) -> ExitCode {
    let layout = GroupLayout::new(total, max_sources, min_files);

    if json {
        return match serde_json::to_string_pretty(&layout) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    println!(
        "{} sources, max {} per file, at least {} file(s)",
        layout.total, layout.max_sources, layout.min_files
    );
    println!("Group size: {}", layout.group_size);
    println!("Aggregate files: {}", layout.sizes.len());
    for (idx, size) in layout.sizes.iter().enumerate() {
        println!("  {:>3}: {} source(s)", idx, size);
    }

    ExitCode::from(EXIT_SUCCESS)
}
