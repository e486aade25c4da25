//! Engine adapters.
//!
//! Each adapter translates the engine-agnostic constraint model into one
//! engine's native form and normalizes that engine's result into an
//! `Outcome`. The runner and reporter only ever see this contract.

pub mod boon_schema;
pub mod document;
pub mod json_schema;
pub mod mock;
pub mod path;
pub mod traits;
pub mod typed;

use std::sync::Arc;

pub use boon_schema::BoonAdapter;
pub use json_schema::JsonSchemaAdapter;
pub use mock::{MockAdapter, MockConfig, MockCounters};
pub use traits::{Capabilities, CompiledValidator, EngineAdapter, Outcome};
pub use typed::TypedAdapter;

/// Engine ids of the built-in adapters, in registration order.
pub const BUILTIN_ENGINES: [&str; 3] = [json_schema::ENGINE_ID, boon_schema::ENGINE_ID, typed::ENGINE_ID];

/// Look up a built-in adapter by engine id.
pub fn adapter_by_name(name: &str) -> Option<Arc<dyn EngineAdapter>> {
    match name {
        json_schema::ENGINE_ID => Some(Arc::new(JsonSchemaAdapter::new())),
        boon_schema::ENGINE_ID => Some(Arc::new(BoonAdapter::new())),
        typed::ENGINE_ID => Some(Arc::new(TypedAdapter::new())),
        _ => None,
    }
}

/// Every built-in adapter.
pub fn builtin_adapters() -> Vec<Arc<dyn EngineAdapter>> {
    BUILTIN_ENGINES.iter().filter_map(|name| adapter_by_name(name)).collect()
}
