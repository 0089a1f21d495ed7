//! Manifest persistence - reading and writing the JSON wire format

use crate::errors::ManifestError;
use crate::types::Manifest;
use std::io::Write;
use std::path::Path;
use tracing::debug;

impl Manifest {
    /// Parse a manifest from its JSON document
    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(content)?;
        if manifest.namespace.trim().is_empty() {
            return Err(ManifestError::InvalidManifest(
                "namespace must not be empty".to_string(),
            ));
        }
        Ok(manifest)
    }

    /// Serialize this manifest to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a manifest from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ManifestError> {
        debug!("Reading manifest from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let manifest = Self::from_json_str(&content)?;
        debug!(
            "Loaded manifest '{}' with {} command(s)",
            manifest.namespace,
            manifest.command_count()
        );
        Ok(manifest)
    }

    /// Save manifest to a specific path with atomic write
    pub fn save_to_path(&self, path: &Path) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut content = self.to_json_string()?;
        content.push('\n');

        let temp_path = path.with_extension("json.tmp");
        {
            let file = std::fs::File::create(&temp_path)?;
            let mut writer = std::io::BufWriter::new(file);
            writer.write_all(content.as_bytes())?;
            writer.flush()?;
        }
        std::fs::rename(&temp_path, path)?;

        debug!("Manifest '{}' written to {}", self.namespace, path.display());
        Ok(())
    }
}
