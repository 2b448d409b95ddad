//! Unique ID command

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::new_unique_hex;
use crate::storage::Config;

/// Prints a unique hex ID; flags override the configured policy
pub fn run(
    output: &Output,
    config: &Config,
    prefix: Option<String>,
    bytes: Option<usize>,
    max_len: Option<usize>,
) -> Result<()> {
    let policy = &config.unique_id;
    let prefix = prefix.unwrap_or_else(|| policy.prefix.clone());
    let bytes = bytes.unwrap_or(policy.random_bytes);
    let max_len = max_len.unwrap_or(policy.max_len);

    let id = new_unique_hex(&prefix, bytes, max_len).context("Failed to generate ID")?;

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id }));
    } else {
        println!("{}", id);
    }

    Ok(())
}
