//! `datagate describe` - print what describe_entities returns for a role.

use anyhow::{Context, Result};
use datagate_core::RuntimeConfig;
use datagate_policy::{ANONYMOUS_ROLE, DescribeOptions, ExposurePolicy};
use std::path::Path;

pub fn run(
    config_path: &Path,
    role: Option<&str>,
    name_only: bool,
    entities: Option<Vec<String>>,
) -> Result<()> {
    let config = RuntimeConfig::from_file(config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    let options = DescribeOptions {
        name_only,
        entities,
    };
    let role = role.unwrap_or(ANONYMOUS_ROLE);

    match ExposurePolicy::new(&config).describe_entities(role, &options) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err.to_envelope())?);
            anyhow::bail!("describe_entities failed: {}", err.kind)
        }
    }
}
