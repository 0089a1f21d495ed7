//! Registry of published manifests
//!
//! Manifests are kept in registration order behind `Arc` so a sync can hand
//! out a cheap immutable snapshot. A namespace index gives direct access by
//! key. Publishing validates first and either admits the whole manifest or
//! nothing.

use crate::errors::PublishError;
use crate::lookup::{resolve_command, ResolvedCommand};
use crate::types::Manifest;
use crate::validation::{validate, CommandField, ErrorKey, ValidationReport};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry shared between the publishing surface and the interpreter
pub type SharedRegistry = Arc<RwLock<Registry>>;

#[derive(Debug, Default)]
pub struct Registry {
    manifests: Vec<Arc<Manifest>>,
    namespace_index: AHashMap<String, usize>,
    /// Command id -> owning namespace, across every published manifest
    command_owners: AHashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding only the demo manifest
    pub fn seeded() -> Self {
        let mut registry = Self::new();
        registry.admit(Manifest::demo());
        registry
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Validate and admit `manifest`, replacing any manifest with the same
    /// namespace. The stored copy is stamped with a fresh `generated_at`.
    pub fn publish(&mut self, manifest: Manifest) -> Result<Arc<Manifest>, PublishError> {
        let mut report = validate(&manifest);
        self.check_ownership(&manifest, &mut report);

        if !report.is_deployable() {
            debug!(
                "Rejected manifest '{}' with {} error(s)",
                manifest.namespace,
                report.len()
            );
            return Err(PublishError::Rejected {
                namespace: manifest.namespace,
                report,
            });
        }

        let stamped = Manifest {
            generated_at: chrono::Utc::now().to_rfc3339(),
            ..manifest
        };
        Ok(self.admit(stamped))
    }

    fn check_ownership(&self, manifest: &Manifest, report: &mut ValidationReport) {
        for command in &manifest.commands {
            let Some(owner) = self.command_owners.get(&command.id) else {
                continue;
            };
            if owner != &manifest.namespace {
                report.insert(
                    ErrorKey::command(&command.id, CommandField::Id),
                    format!("Command id already published by namespace '{}'", owner),
                );
            }
        }
    }

    fn admit(&mut self, manifest: Manifest) -> Arc<Manifest> {
        let namespace = manifest.namespace.clone();
        let manifest = Arc::new(manifest);

        match self.namespace_index.get(&namespace).copied() {
            Some(idx) => {
                let previous = std::mem::replace(&mut self.manifests[idx], Arc::clone(&manifest));
                for command in &previous.commands {
                    self.command_owners.remove(&command.id);
                }
                info!("Replaced manifest '{}'", namespace);
            }
            None => {
                self.namespace_index
                    .insert(namespace.clone(), self.manifests.len());
                self.manifests.push(Arc::clone(&manifest));
                info!("Published manifest '{}'", namespace);
            }
        }

        for command in &manifest.commands {
            self.command_owners
                .insert(command.id.clone(), namespace.clone());
        }
        manifest
    }

    /// Manifest published under `namespace`
    pub fn get(&self, namespace: &str) -> Option<&Arc<Manifest>> {
        self.namespace_index
            .get(namespace)
            .and_then(|&idx| self.manifests.get(idx))
    }

    /// Two-tier lookup: exact id first, then the first bare name match
    pub fn lookup(&self, target: &str) -> Option<ResolvedCommand<'_>> {
        resolve_command(&self.manifests, target)
    }

    /// Published manifests in registration order
    pub fn all(&self) -> &[Arc<Manifest>] {
        &self.manifests
    }

    /// Immutable copy of the current contents for a local cache
    pub fn snapshot(&self) -> Vec<Arc<Manifest>> {
        self.manifests.clone()
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }
}
