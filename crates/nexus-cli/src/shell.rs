//! Owner of one simulated terminal session
//!
//! A `Shell` holds the session state and local cache between turns. Turns
//! take `&mut self`, so a second line cannot start before the first one,
//! pipeline included, has finished.

use crate::events::EventSink;
use crate::interpreter::{Interpreter, BANNER};
use crate::session::{LocalCache, SessionState};
use nexus_logger as logger;
use nexus_manifest::{Manifest, Registry, SharedRegistry};
use std::path::PathBuf;
use tracing::debug;

/// Create the registry for a session: the optional demo manifest, then each
/// manifest file in order. Files that cannot be read or fail validation are
/// reported and skipped.
pub fn build_registry(seed_demo: bool, manifest_paths: &[PathBuf]) -> SharedRegistry {
    let mut registry = if seed_demo {
        Registry::seeded()
    } else {
        Registry::new()
    };

    for path in manifest_paths {
        let manifest = match Manifest::load_from_path(path) {
            Ok(manifest) => manifest,
            Err(e) => {
                logger::warn(&format!("Skipping {}: {}", path.display(), e));
                continue;
            }
        };
        match registry.publish(manifest) {
            Ok(published) => logger::info(&format!(
                "Published '{}' from {}",
                published.namespace,
                path.display()
            )),
            Err(e) => logger::warn(&format!("Skipping {}: {}", path.display(), e)),
        }
    }

    debug!("Registry ready with {} manifest(s)", registry.len());
    registry.into_shared()
}

pub struct Shell {
    interpreter: Interpreter,
    session: SessionState,
    cache: LocalCache,
}

impl Shell {
    pub fn new(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            session: SessionState::default(),
            cache: LocalCache::default(),
        }
    }

    pub fn banner(&self, sink: &mut dyn EventSink) {
        BANNER.iter().for_each(|line| sink.info(line));
    }

    /// Run one turn to completion
    pub async fn handle_line(&mut self, line: &str, sink: &mut dyn EventSink) {
        let session = self.session;
        let cache = std::mem::take(&mut self.cache);
        let (session, cache) = self.interpreter.interpret(line, session, cache, sink).await;
        self.session = session;
        self.cache = cache;
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, Transcript};
    use crate::interpreter::InterpreterOptions;
    use crate::session::CacheState;
    use tempfile::TempDir;

    fn shell(registry: SharedRegistry) -> Shell {
        Shell::new(Interpreter::new(
            registry,
            InterpreterOptions::default().without_delays(),
        ))
    }

    #[tokio::test]
    async fn test_state_carries_between_turns() {
        let mut shell = shell(build_registry(true, &[]));
        let mut transcript = Transcript::new();
        shell.banner(&mut transcript);
        for line in ["nexus login nxs_key", "nexus sync", "nexus run invoice-generate"] {
            shell.handle_line(line, &mut transcript).await;
        }
        assert_eq!(shell.session(), SessionState::LoggedIn(CacheState::Synced));
        assert_eq!(shell.cache().len(), 1);
        assert_eq!(transcript.contents_of(EventKind::Input).len(), 3);
        assert!(transcript.contents_of(EventKind::Error).is_empty());
        assert_eq!(transcript.events()[0].content, BANNER[0]);
    }

    #[tokio::test]
    async fn test_clear_wipes_transcript_including_echo() {
        let mut shell = shell(build_registry(false, &[]));
        let mut transcript = Transcript::new();
        shell.handle_line("help", &mut transcript).await;
        shell.handle_line("clear", &mut transcript).await;
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_build_registry_skips_bad_files() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let good = temp_dir.path().join("good.json");
        let bad = temp_dir.path().join("bad.json");
        let garbage = temp_dir.path().join("garbage.json");

        let mut valid = Manifest::demo();
        valid.namespace = "reports".to_string();
        valid.commands[0].id = "reports:invoice-generate".to_string();
        assert!(valid.save_to_path(&good).is_ok());

        let mut invalid = valid.clone();
        invalid.namespace = "broken".to_string();
        invalid.commands[0].id = "broken:x".to_string();
        invalid.commands[0].runtime = String::new();
        assert!(invalid.save_to_path(&bad).is_ok());
        assert!(std::fs::write(&garbage, "not json").is_ok());

        let missing = temp_dir.path().join("missing.json");
        let registry = build_registry(true, &[good, bad, garbage, missing]);
        let registry = registry.read();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("reports").is_some());
        assert!(registry.get("broken").is_none());
    }
}
