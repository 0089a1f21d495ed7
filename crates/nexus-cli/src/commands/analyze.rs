//! Run an external analyzer over a source file and keep its manifest

use super::validate::print_report;
use anyhow::Context;
use nexus_logger as logger;
use nexus_manifest::{validate, ExternalProducer, ManifestProducer};
use std::path::PathBuf;

pub struct AnalyzeCommand {
    pub source: PathBuf,
    pub producer: String,
    pub producer_args: Vec<String>,
    pub output: Option<PathBuf>,
}

pub async fn handle_analyze(cmd: AnalyzeCommand) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&cmd.source)
        .with_context(|| format!("Failed to read {}", cmd.source.display()))?;
    let filename = cmd
        .source
        .file_name()
        .map_or_else(|| cmd.source.display().to_string(), |n| n.to_string_lossy().into_owned());

    let producer = ExternalProducer::new(cmd.producer, cmd.producer_args);

    logger::spinner_start(&format!("Analyzing {}...", filename));
    let manifest = match producer.analyze(&source, &filename).await {
        Ok(manifest) => manifest,
        Err(e) => {
            logger::spinner_error(&format!("Analysis of {} failed", filename));
            return Err(e.into());
        }
    };
    logger::spinner_success(&format!(
        "Found {} command(s) in '{}'",
        manifest.command_count(),
        manifest.namespace
    ));

    for warning in &manifest.warnings {
        logger::warn(warning);
    }

    let report = validate(&manifest);
    if !report.is_deployable() {
        logger::warn(&format!(
            "Manifest has {} validation error(s); fix them before publishing",
            report.len()
        ));
        print_report(&report);
    }

    match cmd.output {
        Some(path) => {
            manifest
                .save_to_path(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            logger::success(&format!("Wrote manifest to {}", path.display()));
        }
        None => println!("{}", manifest.to_json_string()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_manifest::Manifest;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_source_file_is_error() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let result = handle_analyze(AnalyzeCommand {
            source: temp_dir.path().join("absent.py"),
            producer: "cat".to_string(),
            producer_args: Vec::new(),
            output: None,
        })
        .await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_producer_output_written() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let canned = temp_dir.path().join("canned.json");
        assert!(Manifest::demo().save_to_path(&canned).is_ok());
        let source = temp_dir.path().join("invoicing.py");
        assert!(std::fs::write(&source, "def generate():\n    pass\n").is_ok());
        let output = temp_dir.path().join("out.json");

        let result = handle_analyze(AnalyzeCommand {
            source,
            producer: "sh".to_string(),
            producer_args: vec![
                "-c".to_string(),
                format!("cat > /dev/null; cat '{}'", canned.display()),
            ],
            output: Some(output.clone()),
        })
        .await;
        assert!(result.is_ok());
        assert!(Manifest::load_from_path(&output).is_ok_and(|m| m.namespace == "billing-service"));
    }
}
