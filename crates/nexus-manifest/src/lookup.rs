//! Two-tier command resolution shared by the registry and the local cache
//!
//! A target is first matched against command ids across every manifest. Only
//! when no id matches is it matched against bare command names, in
//! registration order. Bare names can collide across namespaces; the
//! first-registered manifest wins and later ones are reachable by id only.

use crate::types::{Command, Manifest};
use std::sync::Arc;
use tracing::debug;

pub struct ResolvedCommand<'a> {
    pub manifest: &'a Manifest,
    pub command: &'a Command,
}

/// Resolve `target` over `manifests` in their given order
pub fn resolve_command<'a>(manifests: &'a [Arc<Manifest>], target: &str) -> Option<ResolvedCommand<'a>> {
    if let Some(resolved) = find_by(manifests, |command| command.id == target) {
        debug!("Resolved '{}' by id in '{}'", target, resolved.manifest.namespace);
        return Some(resolved);
    }

    let resolved = find_by(manifests, |command| command.name == target);
    match &resolved {
        Some(hit) => debug!("Resolved '{}' by name in '{}'", target, hit.manifest.namespace),
        None => debug!("No command matches '{}'", target),
    }
    resolved
}

fn find_by<'a>(manifests: &'a [Arc<Manifest>], matches: impl Fn(&Command) -> bool) -> Option<ResolvedCommand<'a>> {
    manifests.iter().find_map(|manifest| {
        manifest
            .commands
            .iter()
            .find(|command| matches(command))
            .map(|command| ResolvedCommand {
                manifest: manifest.as_ref(),
                command,
            })
    })
}
