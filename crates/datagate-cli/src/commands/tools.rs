//! `datagate tools` - list the MCP tools a configuration registers (offline).

use anyhow::{Context, Result};
use datagate_core::RuntimeConfig;
use datagate_mcp::{ToolKind, ToolRegistry};
use std::path::Path;

/// List registered tools with their behaviour badges.
pub fn list(config_path: &Path, verbose: bool) -> Result<()> {
    let config = RuntimeConfig::from_file(config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
    let registry = ToolRegistry::build(&config).context("Failed to build the tool registry")?;

    println!("\n🔧 Available Tools ({}):", registry.len());

    for tool in registry.definitions() {
        let kind = registry
            .try_get_tool(&tool.name)
            .map(|t| t.kind())
            .unwrap_or(ToolKind::BuiltIn);
        let annotations = tool.annotations.as_ref();
        let read_only = annotations.is_some_and(|a| a.read_only == Some(true));
        let destructive = annotations.is_some_and(|a| a.destructive == Some(true));

        let mut badges = vec![kind.label()];
        badges.push(if read_only { "read" } else { "write" });
        if destructive {
            badges.push("destructive");
        }

        println!("   • {} ({})", tool.name, badges.join(", "));

        if let Some(desc) = &tool.description {
            println!("     {}", desc);
        }

        if verbose {
            println!(
                "     Schema: {}",
                serde_json::to_string_pretty(&tool.input_schema)?
            );
        }
    }

    println!();

    Ok(())
}
