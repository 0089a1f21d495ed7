//! Options shared by the interactive shell and `exec`

use crate::interpreter::{Interpreter, InterpreterOptions};
use crate::shell::{build_registry, Shell};
use clap::Args;
use nexus_config::Config;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct SimulatorArgs {
    /// Publish a manifest file before the session starts (repeatable)
    #[arg(long = "manifest", value_name = "FILE")]
    pub manifests: Vec<PathBuf>,

    /// Run sync and the execution pipeline without artificial delays
    #[arg(long)]
    pub no_delay: bool,

    /// Do not publish the built-in billing-service manifest
    #[arg(long)]
    pub no_seed: bool,
}

impl SimulatorArgs {
    /// Manifests from the config file come first, then those on the command line
    pub fn manifest_paths(&self, config: &Config) -> Vec<PathBuf> {
        let mut paths = config.manifest_paths();
        paths.extend(self.manifests.iter().cloned());
        paths
    }

    pub fn build_shell(&self, config: &Config) -> Shell {
        let registry = build_registry(config.seed_demo() && !self.no_seed, &self.manifest_paths(config));
        let mut options = InterpreterOptions::from_config(config);
        if self.no_delay {
            options = options.without_delays();
        }
        Shell::new(Interpreter::new(registry, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, Transcript};

    #[test]
    fn test_config_manifests_come_first() {
        let mut config = Config::default();
        assert!(config.set("manifests", "a.json").is_ok());
        let args = SimulatorArgs {
            manifests: vec![PathBuf::from("b.json")],
            ..Default::default()
        };
        assert_eq!(
            args.manifest_paths(&config),
            vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
        );
    }

    async fn success_lines(args: &SimulatorArgs) -> Vec<String> {
        let mut shell = args.build_shell(&Config::default());
        let mut transcript = Transcript::new();
        for line in ["nexus login nxs_x", "nexus sync"] {
            shell.handle_line(line, &mut transcript).await;
        }
        transcript
            .contents_of(EventKind::Success)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_no_seed_wins_over_config() {
        let seeded = SimulatorArgs {
            no_delay: true,
            ..Default::default()
        };
        assert!(success_lines(&seeded).await.iter().any(|line| line == "Synced 1 manifests."));

        let unseeded = SimulatorArgs {
            no_seed: true,
            no_delay: true,
            ..Default::default()
        };
        assert!(success_lines(&unseeded).await.iter().any(|line| line == "Synced 0 manifests."));
    }
}
