//! Tool adapters handed to the model. Each one is a thin client over an
//! external service or a local process.

pub mod process;
pub mod python;
pub mod shell;
pub mod stock;
pub mod web_search;

pub use process::{run_command, CommandOutput};
pub use python::RunPython;
pub use shell::RunShell;
pub use stock::StockPrice;
pub use web_search::WebSearch;

use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display, strum_macros::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolKind {
    WebSearch,
    StockPrice,
    Python,
    Shell,
}

/// JSON schema for a tool's argument type, as the model sees it.
pub(crate) fn parameters<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}
