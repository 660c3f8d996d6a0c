//! JSON reporter
//!
//! Outputs events or scan results as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use anyhow::Result;
use serde::Serialize;

pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
