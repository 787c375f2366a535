//! `datagate check` command implementation.
//!
//! Validates a runtime configuration:
//! - The file loads and passes load-time validation
//! - The tool registry builds (no duplicate tool names)
//! - Every registered input schema compiles as a JSON schema
//! - Exposure findings: hidden entities, ignored flags, unreachable procedures

use anyhow::Result;
use datagate_core::RuntimeConfig;
use datagate_mcp::ToolRegistry;
use datagate_policy::{EntityExposure, ExposurePolicy};
use std::path::Path;

// ============================================================================
// Check Result Types
// ============================================================================

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// Category of the check that produced this finding.
    pub category: &'static str,
    pub message: String,
    /// Entity or tool the finding is about.
    pub location: Option<String>,
}

impl CheckFinding {
    fn error(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            message: message.into(),
            location: None,
        }
    }

    fn warning(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            message: message.into(),
            location: None,
        }
    }

    fn info(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            category,
            message: message.into(),
            location: None,
        }
    }

    fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Results from running all checks.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub findings: Vec<CheckFinding>,
}

impl CheckResults {
    fn extend(&mut self, findings: impl IntoIterator<Item = CheckFinding>) {
        self.findings.extend(findings);
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// Print human-readable summary.
    pub fn print_summary(&self) {
        for (severity, title) in [
            (Severity::Error, "❌ Errors"),
            (Severity::Warning, "⚠️  Warnings"),
            (Severity::Info, "ℹ️  Exposure"),
        ] {
            let findings: Vec<_> = self
                .findings
                .iter()
                .filter(|f| f.severity == severity)
                .collect();
            if findings.is_empty() {
                continue;
            }
            println!("\n{} ({}):", title, findings.len());
            println!("{}", "─".repeat(60));
            for finding in findings {
                print_finding(finding);
            }
        }

        println!();
        println!("{}", "═".repeat(60));
        let errors = self.count(Severity::Error);
        let warnings = self.count(Severity::Warning);
        if errors == 0 && warnings == 0 {
            println!("✅ All checks passed!");
        } else {
            println!("Summary: {} error(s), {} warning(s)", errors, warnings);
        }
    }
}

fn print_finding(finding: &CheckFinding) {
    let icon = match finding.severity {
        Severity::Error => "✗",
        Severity::Warning => "⚠",
        Severity::Info => "•",
    };
    let location = finding
        .location
        .as_ref()
        .map(|l| format!(" [{}]", l))
        .unwrap_or_default();
    println!("  {} [{}]{}: {}", icon, finding.category, location, finding.message);
}

// ============================================================================
// Entry point
// ============================================================================

/// Run every check and print the findings. Fails when any check errors.
pub fn run(config_path: &Path) -> Result<()> {
    println!("🔍 Checking {}", config_path.display());

    let results = check_file(config_path);
    results.print_summary();

    if results.has_errors() {
        anyhow::bail!(
            "configuration check failed with {} error(s)",
            results.count(Severity::Error)
        );
    }
    Ok(())
}

/// Run every check against a configuration file.
pub fn check_file(config_path: &Path) -> CheckResults {
    let mut results = CheckResults::default();

    let config = match RuntimeConfig::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            results.extend([CheckFinding::error("config", e.to_string())]);
            return results;
        }
    };

    results.extend(check_registry(&config));
    results.extend(check_exposure(&config));
    results
}

// ============================================================================
// Check 1: Tool registry
// ============================================================================

fn check_registry(config: &RuntimeConfig) -> Vec<CheckFinding> {
    let registry = match ToolRegistry::build(config) {
        Ok(registry) => registry,
        Err(e) => return vec![CheckFinding::error("tools", e.to_string())],
    };

    let mut findings = Vec::new();
    if !config.mcp().enabled {
        findings.push(CheckFinding::info("tools", "MCP is disabled; no tools are served"));
    }

    for tool in registry.definitions() {
        if let Err(e) = jsonschema::validator_for(&tool.input_schema) {
            findings.push(
                CheckFinding::error("json-schema", format!("Invalid input schema: {}", e))
                    .at(&tool.name),
            );
        }
    }
    findings
}

// ============================================================================
// Check 2: Entity exposure
// ============================================================================

fn check_exposure(config: &RuntimeConfig) -> Vec<CheckFinding> {
    let policy = ExposurePolicy::new(config);
    let exposures = policy.exposures();
    let mut findings = Vec::new();

    if exposures.is_empty() {
        findings.push(CheckFinding::warning(
            "entities",
            "No entities are configured; describe_entities will return NoEntitiesConfigured",
        ));
        return findings;
    }

    if !exposures.iter().any(EntityExposure::is_listed) {
        findings.push(CheckFinding::warning(
            "entities",
            "Every entity sets dml-tools: false; describe_entities will return \
             AllEntitiesFilteredDmlDisabled",
        ));
    }

    for exposure in &exposures {
        if exposure.custom_tool_ignored {
            findings.push(
                CheckFinding::warning(
                    "mcp",
                    format!(
                        "custom-tool is ignored for a {}; only stored procedures become custom tools",
                        exposure.source_type
                    ),
                )
                .at(&exposure.name),
            );
        }
        if !exposure.dml_tools && !exposure.custom_tool {
            findings.push(
                CheckFinding::warning(
                    "mcp",
                    "Entity is not reachable through any tool (dml-tools: false and no custom tool)",
                )
                .at(&exposure.name),
            );
        }
        findings.push(CheckFinding::info("exposure", describe(exposure)).at(&exposure.name));
    }
    findings
}

fn describe(exposure: &EntityExposure) -> String {
    let mut parts = vec![exposure.source_type.to_string()];
    parts.push(if exposure.is_listed() {
        "listed by describe_entities".to_string()
    } else {
        "hidden from describe_entities".to_string()
    });
    if exposure.custom_tool {
        parts.push("custom tool".to_string());
    }
    parts.join(", ")
}
