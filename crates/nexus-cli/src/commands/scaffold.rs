use anyhow::Context;
use nexus_logger as logger;
use nexus_manifest::Manifest;
use std::path::PathBuf;

/// Write an empty manual-entry manifest to `output`, or stdout
pub fn handle_scaffold(output: Option<PathBuf>, namespace: Option<String>) -> anyhow::Result<()> {
    let mut manifest = Manifest::scaffold();
    if let Some(namespace) = namespace {
        manifest.namespace = namespace;
    }

    match output {
        Some(path) => {
            manifest
                .save_to_path(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            logger::success(&format!("Wrote manifest '{}' to {}", manifest.namespace, path.display()));
        }
        None => println!("{}", manifest.to_json_string()?),
    }
    Ok(())
}
