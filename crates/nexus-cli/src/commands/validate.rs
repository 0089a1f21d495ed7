use anyhow::Context;
use colored::Colorize;
use nexus_logger as logger;
use nexus_manifest::{validate, Manifest, ValidationReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Serialize)]
struct ValidationSummary<'a> {
    namespace: &'a str,
    deployable: bool,
    errors: BTreeMap<String, &'a str>,
}

fn summarize<'a>(manifest: &'a Manifest, report: &'a ValidationReport) -> ValidationSummary<'a> {
    ValidationSummary {
        namespace: &manifest.namespace,
        deployable: report.is_deployable(),
        errors: report.iter().map(|(key, msg)| (key.to_string(), msg)).collect(),
    }
}

/// Print the errors of `report`, one per line, grouped by command
pub fn print_report(report: &ValidationReport) {
    println!("{}", "Validation errors:".bold().red());
    let mut current_command = "";
    for (key, message) in report.iter() {
        if key.command_id() != current_command {
            current_command = key.command_id();
            println!(" {}:", current_command.bold().blue());
        }
        println!("   {} {}", format!("{}:", key).cyan(), message);
    }
}

/// Validate a manifest file. Returns whether it is deployable.
pub fn handle_validate(file: &Path, json: bool) -> anyhow::Result<bool> {
    let manifest = Manifest::load_from_path(file)
        .with_context(|| format!("Failed to read manifest {}", file.display()))?;
    let report = validate(&manifest);

    if json {
        println!("{}", serde_json::to_string_pretty(&summarize(&manifest, &report))?);
    } else if report.is_deployable() {
        logger::success(&format!(
            "Manifest '{}' is deployable ({} command(s))",
            manifest.namespace,
            manifest.command_count()
        ));
    } else {
        print_report(&report);
    }

    Ok(report.is_deployable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_file_reports_deployability() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let good = temp_dir.path().join("good.json");
        assert!(Manifest::demo().save_to_path(&good).is_ok());
        assert!(handle_validate(&good, true).is_ok_and(|deployable| deployable));

        let mut broken = Manifest::demo();
        broken.commands[0].name = "Invoice_Generate".to_string();
        let bad = temp_dir.path().join("bad.json");
        assert!(broken.save_to_path(&bad).is_ok());
        assert!(handle_validate(&bad, false).is_ok_and(|deployable| !deployable));
    }

    #[test]
    fn test_summary_keys_are_rendered() {
        let mut broken = Manifest::demo();
        broken.commands[0].runtime = String::new();
        let report = validate(&broken);
        let summary = summarize(&broken, &report);
        assert!(!summary.deployable);
        assert_eq!(
            summary.errors.get("cmd-billing-service:invoice-generate-runtime"),
            Some(&"Runtime image is required")
        );
    }

    #[test]
    fn test_missing_file_is_error() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        assert!(handle_validate(&temp_dir.path().join("absent.json"), false).is_err());
    }
}
