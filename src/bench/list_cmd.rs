use std::fmt::Write as _;

use crate::adapter::{self, Capabilities};
use crate::BenchResult;
use crate::fixture::builtin_workloads;

fn describe_capabilities(caps: &Capabilities) -> String {
    let mut parts = Vec::new();
    if caps.length_bounds {
        parts.push("length".to_string());
    }
    if caps.numeric_minimum {
        parts.push("minimum".to_string());
    }
    if caps.integer_only {
        parts.push("integer".to_string());
    }
    if !caps.formats.is_empty() {
        let formats: Vec<_> = caps.formats.iter().map(|f| f.as_str()).collect();
        parts.push(format!("formats={}", formats.join("/")));
    }
    if caps.self_reference {
        parts.push("self-reference".to_string());
    }
    if caps.nested_items {
        parts.push("nested-items".to_string());
    }
    if !caps.runtime_schemas {
        parts.push("compiled-in models only".to_string());
    }
    if caps.null_as_absent {
        parts.push("null=absent".to_string());
    }
    parts.join(", ")
}

/// Engines with their capabilities, then workloads with their fixtures.
pub fn render_listing() -> BenchResult<String> {
    let mut out = String::new();
    let _ = writeln!(out, "Engines:");
    for engine in adapter::builtin_adapters() {
        let _ = writeln!(
            out,
            "  {} {} [{}]",
            engine.engine_id(),
            engine.version().unwrap_or_else(|| "-".to_string()),
            describe_capabilities(&engine.capabilities())
        );
    }

    let _ = writeln!(out, "\nWorkloads:");
    for workload in builtin_workloads()? {
        let _ = writeln!(out, "  {}: {}", workload.name, workload.description);
        for fixture in &workload.fixtures {
            let _ = writeln!(
                out,
                "    {}/{} => {}",
                fixture.schema,
                fixture.id,
                fixture.expected.describe()
            );
        }
    }
    Ok(out)
}

pub fn run() -> BenchResult<()> {
    print!("{}", render_listing()?);
    Ok(())
}
