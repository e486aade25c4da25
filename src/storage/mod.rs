//! Output sinks for one run's results.

pub mod csv;
pub mod json;
pub mod text;

use std::path::Path;

use anyhow::Context;

use crate::BenchResult;

pub use csv::{CSV_HEADERS, CsvExporter};
pub use json::write_json;
pub use text::write_text;

fn ensure_parent(path: &Path) -> BenchResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    Ok(())
}
