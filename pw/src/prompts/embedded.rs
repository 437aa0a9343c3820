//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Project plan generation prompt
pub const PLAN: &str = include_str!("../../prompts/plan.pmt");

/// Connectivity check sent by `pw probe`
pub const PROBE: &str = "Hello, can you reply with 'OK'?";

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "plan" => Some(PLAN),
        "probe" => Some(PROBE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
