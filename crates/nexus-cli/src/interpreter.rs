//! Command interpreter of the simulated terminal
//!
//! One call to [`Interpreter::interpret`] is one turn: the line is echoed,
//! tokenized on whitespace and dispatched. Session state and the local cache
//! go in by value and come back out, updated only by a successful
//! transition. Every failure is rendered as an `error` event.

use crate::binding::bind;
use crate::errors::InterpreterError;
use crate::events::EventSink;
use crate::pipeline::{pause, ExecutionPipeline, StageDelays};
use crate::session::{LocalCache, SessionState};
use nexus_config::Config;
use nexus_manifest::SharedRegistry;
use std::time::Duration;
use tracing::debug;

pub const BANNER: [&str; 3] = [
    "Nexus CLI v1.0.4 [Simulator]",
    "Type \"help\" for a list of commands.",
    "Try \"nexus login <key>\" to start.",
];

const HELP: [&str; 6] = [
    "Available commands:",
    "  nexus login <key>    Authenticate with Nexus Cloud",
    "  nexus sync           Fetch latest manifests from production",
    "  nexus list           List all available commands",
    "  nexus run <cmd>      Execute a remote command",
    "  clear                Clear terminal",
];

const USAGE: [&str; 2] = ["Nexus CLI v1.0.4", "Usage: nexus <command> [flags]"];

const LIST_HEADER: [&str; 2] = [
    "NAMESPACE       COMMAND             DESCRIPTION",
    "-----------     -------             -----------",
];

/// Timing and identity knobs of the interpreter
#[derive(Debug, Clone)]
pub struct InterpreterOptions {
    pub account: String,
    pub sync_delay: Duration,
    pub stages: StageDelays,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl InterpreterOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            account: config.account().to_string(),
            sync_delay: config.sync_delay(),
            stages: StageDelays::from_config(config),
        }
    }

    /// Same identity, no suspensions
    #[must_use]
    pub fn without_delays(self) -> Self {
        Self {
            sync_delay: Duration::ZERO,
            stages: StageDelays::none(),
            ..self
        }
    }
}

pub struct Interpreter {
    registry: SharedRegistry,
    pipeline: ExecutionPipeline,
    account: String,
    sync_delay: Duration,
}

impl Interpreter {
    pub fn new(registry: SharedRegistry, options: InterpreterOptions) -> Self {
        Self {
            registry,
            pipeline: ExecutionPipeline::new(options.stages),
            account: options.account,
            sync_delay: options.sync_delay,
        }
    }

    /// Process one line to completion, streaming its events into `sink`
    pub async fn interpret(
        &self,
        line: &str,
        session: SessionState,
        cache: LocalCache,
        sink: &mut dyn EventSink,
    ) -> (SessionState, LocalCache) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return (session, cache);
        }

        sink.input(line.trim_end_matches(['\r', '\n']));

        let mut session = session;
        let mut cache = cache;
        if let Err(e) = self.dispatch(&tokens, &mut session, &mut cache, sink).await {
            debug!("'{}' failed: {:?}", tokens.join(" "), e);
            sink.error(&e.to_string());
        }
        (session, cache)
    }

    async fn dispatch(
        &self,
        tokens: &[&str],
        session: &mut SessionState,
        cache: &mut LocalCache,
        sink: &mut dyn EventSink,
    ) -> Result<(), InterpreterError> {
        match tokens[0] {
            "clear" => {
                sink.clear();
                Ok(())
            }
            "help" => {
                HELP.iter().for_each(|line| sink.output(line));
                Ok(())
            }
            "nexus" => self.nexus(&tokens[1..], session, cache, sink).await,
            other => Err(InterpreterError::UnknownCommand(other.to_string())),
        }
    }

    async fn nexus(
        &self,
        args: &[&str],
        session: &mut SessionState,
        cache: &mut LocalCache,
        sink: &mut dyn EventSink,
    ) -> Result<(), InterpreterError> {
        let Some(&subcommand) = args.first() else {
            USAGE.iter().for_each(|line| sink.output(line));
            return Ok(());
        };

        if subcommand == "login" {
            *session = session.login(args.get(1).copied())?;
            sink.success(&format!("Successfully authenticated as {}", self.account));
            return Ok(());
        }

        session.require_auth()?;

        match subcommand {
            "sync" => self.sync(session, cache, sink).await,
            "list" => {
                list(cache, sink);
                Ok(())
            }
            "run" => self.run(&args[1..], cache, sink).await,
            other => Err(InterpreterError::UnknownSubcommand(other.to_string())),
        }
    }

    async fn sync(
        &self,
        session: &mut SessionState,
        cache: &mut LocalCache,
        sink: &mut dyn EventSink,
    ) -> Result<(), InterpreterError> {
        sink.info("Connecting to Nexus Control Plane...");
        pause(self.sync_delay).await;

        // The read guard is released before anything else happens
        let snapshot = self.registry.read().snapshot();
        let (next_session, next_cache) = session.sync(snapshot)?;
        *session = next_session;
        *cache = next_cache;

        debug!("Local cache now holds {} manifest(s)", cache.len());
        sink.success(&format!("Synced {} manifests.", cache.len()));
        Ok(())
    }

    async fn run(&self, args: &[&str], cache: &LocalCache, sink: &mut dyn EventSink) -> Result<(), InterpreterError> {
        let Some(&target) = args.first() else {
            return Err(InterpreterError::MissingTarget);
        };
        if cache.is_empty() {
            return Err(InterpreterError::CacheEmpty);
        }

        let resolved = cache
            .lookup(target)
            .ok_or_else(|| InterpreterError::NotFound(target.to_string()))?;
        let invocation = bind(&resolved.manifest.namespace, resolved.command, &args[1..])?;

        self.pipeline.execute(&invocation, sink).await;
        Ok(())
    }
}

fn list(cache: &LocalCache, sink: &mut dyn EventSink) {
    if cache.is_empty() {
        sink.output("No commands found. Run \"nexus sync\" to fetch manifests.");
        return;
    }

    LIST_HEADER.iter().for_each(|line| sink.output(line));
    for manifest in cache.manifests() {
        for command in &manifest.commands {
            sink.output(&format!(
                "{:<15} {:<19} {}",
                manifest.namespace, command.name, command.description
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, Transcript};
    use crate::pipeline::EXIT_SENTINEL;
    use crate::session::{CacheState, SessionError};
    use nexus_manifest::{Argument, Command, Manifest, Registry};

    fn refund_manifest() -> Manifest {
        Manifest {
            namespace: "payments".to_string(),
            commands: vec![Command {
                name: "process-refund".to_string(),
                id: "payments:process-refund".to_string(),
                description: "Refund a charge".to_string(),
                language: "go".to_string(),
                runtime: "golang:1.22".to_string(),
                returns: "json".to_string(),
                arguments: vec![Argument {
                    name: "amount".to_string(),
                    cli: "--amount".to_string(),
                    required: true,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Manifest::scaffold()
        }
    }

    fn interpreter() -> Interpreter {
        let mut registry = Registry::seeded();
        assert!(registry.publish(refund_manifest()).is_ok());
        Interpreter::new(
            registry.into_shared(),
            InterpreterOptions::default().without_delays(),
        )
    }

    async fn turn(
        interpreter: &Interpreter,
        line: &str,
        state: (SessionState, LocalCache),
    ) -> (SessionState, LocalCache, Transcript) {
        let mut transcript = Transcript::new();
        let (session, cache) = interpreter.interpret(line, state.0, state.1, &mut transcript).await;
        (session, cache, transcript)
    }

    async fn synced(interpreter: &Interpreter) -> (SessionState, LocalCache) {
        let (s, c, _) = turn(interpreter, "nexus login nxs_abc", Default::default()).await;
        let (s, c, _) = turn(interpreter, "nexus sync", (s, c)).await;
        (s, c)
    }

    #[tokio::test]
    async fn test_empty_line_is_noop() {
        let interp = interpreter();
        let (session, cache, transcript) = turn(&interp, "   \t", Default::default()).await;
        assert_eq!(session, SessionState::LoggedOut);
        assert!(cache.is_empty());
        assert!(transcript.is_empty());
    }

    #[tokio::test]
    async fn test_list_before_login_is_auth_error() {
        let interp = interpreter();
        let (session, _, transcript) = turn(&interp, "nexus list", Default::default()).await;
        assert_eq!(session, SessionState::LoggedOut);
        assert_eq!(
            transcript.contents_of(EventKind::Error),
            vec![SessionError::NotLoggedIn.to_string()]
        );
        assert_eq!(transcript.events()[0].kind, EventKind::Input);
    }

    #[tokio::test]
    async fn test_login_good_and_bad_keys() {
        let interp = interpreter();
        let (session, _, transcript) = turn(&interp, "nexus login nxs_abc", Default::default()).await;
        assert_eq!(session, SessionState::LoggedIn(CacheState::Empty));
        assert_eq!(
            transcript.contents_of(EventKind::Success),
            vec!["Successfully authenticated as architect@nexus.dev"]
        );

        let (session, _, transcript) = turn(&interp, "nexus login badkey", Default::default()).await;
        assert_eq!(session, SessionState::LoggedOut);
        assert_eq!(
            transcript.contents_of(EventKind::Error),
            vec!["Invalid API key format. Expected starts with \"nxs_\""]
        );
    }

    #[tokio::test]
    async fn test_sync_and_list() {
        let interp = interpreter();
        let (session, cache) = synced(&interp).await;
        assert_eq!(session, SessionState::LoggedIn(CacheState::Synced));
        assert_eq!(cache.len(), 2);

        let (_, _, transcript) = turn(&interp, "nexus list", (session, cache)).await;
        assert_eq!(
            transcript.contents_of(EventKind::Output),
            vec![
                LIST_HEADER[0],
                LIST_HEADER[1],
                "billing-service invoice-generate    Generates a PDF invoice",
                "payments        process-refund      Refund a charge",
            ]
        );
    }

    #[tokio::test]
    async fn test_list_with_empty_cache_instructs_sync() {
        let interp = interpreter();
        let (s, c, _) = turn(&interp, "nexus login nxs_abc", Default::default()).await;
        let (_, _, transcript) = turn(&interp, "nexus list", (s, c)).await;
        assert_eq!(
            transcript.contents_of(EventKind::Output),
            vec!["No commands found. Run \"nexus sync\" to fetch manifests."]
        );
    }

    #[tokio::test]
    async fn test_run_demo_command_to_completion() {
        let interp = interpreter();
        let state = synced(&interp).await;
        let (_, _, transcript) = turn(&interp, "nexus run billing-service:invoice-generate", state).await;
        let last = transcript.last();
        assert!(last.is_some_and(|e| e.kind == EventKind::Success && e.content == EXIT_SENTINEL));
        assert!(transcript.contents_of(EventKind::Error).is_empty());
    }

    #[tokio::test]
    async fn test_run_missing_required_flag_skips_pipeline() {
        let interp = interpreter();
        let state = synced(&interp).await;
        let (_, _, transcript) = turn(&interp, "nexus run process-refund", state).await;
        assert_eq!(transcript.events().len(), 2);
        assert_eq!(
            transcript.contents_of(EventKind::Error),
            vec!["Error: Missing required flags: --amount"]
        );
    }

    #[tokio::test]
    async fn test_run_errors_in_check_order() {
        let interp = interpreter();
        let (s, c, _) = turn(&interp, "nexus login nxs_abc", Default::default()).await;

        let (s, c, t) = turn(&interp, "nexus run", (s, c)).await;
        assert_eq!(t.contents_of(EventKind::Error), vec![InterpreterError::MissingTarget.to_string()]);

        let (s, c, t) = turn(&interp, "nexus run anything", (s, c)).await;
        assert_eq!(t.contents_of(EventKind::Error), vec![InterpreterError::CacheEmpty.to_string()]);

        let (s, c, _) = turn(&interp, "nexus sync", (s, c)).await;
        let (_, _, t) = turn(&interp, "nexus run nope", (s, c)).await;
        assert_eq!(
            t.contents_of(EventKind::Error),
            vec!["Error: Command \"nope\" not found in local cache."]
        );
    }

    #[tokio::test]
    async fn test_unknown_command_and_subcommand() {
        let interp = interpreter();
        let (_, _, t) = turn(&interp, "ls -la", Default::default()).await;
        assert_eq!(
            t.contents_of(EventKind::Error),
            vec!["command not found: ls. Try \"nexus\" or \"help\"."]
        );

        let (s, c, _) = turn(&interp, "nexus login nxs_abc", Default::default()).await;
        let (_, _, t) = turn(&interp, "nexus deploy", (s, c)).await;
        assert_eq!(t.contents_of(EventKind::Error), vec!["Unknown command: deploy"]);
    }

    #[tokio::test]
    async fn test_help_usage_and_clear_work_logged_out() {
        let interp = interpreter();
        let (_, _, t) = turn(&interp, "help", Default::default()).await;
        assert_eq!(t.contents_of(EventKind::Output).len(), HELP.len());

        let (_, _, t) = turn(&interp, "nexus", Default::default()).await;
        assert_eq!(t.contents_of(EventKind::Output), USAGE.to_vec());

        let (_, _, t) = turn(&interp, "clear", Default::default()).await;
        assert!(t.is_empty());
    }

    #[tokio::test]
    async fn test_cache_is_a_snapshot() {
        let mut registry = Registry::seeded();
        assert!(registry.publish(refund_manifest()).is_ok());
        let shared = registry.into_shared();
        let interp = Interpreter::new(shared.clone(), InterpreterOptions::default().without_delays());

        let (s, c, _) = turn(&interp, "nexus login nxs_abc", Default::default()).await;
        let (s, c, _) = turn(&interp, "nexus sync", (s, c)).await;

        let mut renamed = refund_manifest();
        renamed.namespace = "ledger".to_string();
        renamed.commands[0].id = "ledger:close-books".to_string();
        renamed.commands[0].name = "close-books".to_string();
        assert!(shared.write().publish(renamed).is_ok());

        let (s, c, t) = turn(&interp, "nexus run close-books", (s, c)).await;
        assert_eq!(t.contents_of(EventKind::Error).len(), 1);

        let (s, c, _) = turn(&interp, "nexus sync", (s, c)).await;
        let (_, _, t) = turn(&interp, "nexus run close-books --amount 1", (s, c)).await;
        assert!(t.contents_of(EventKind::Error).is_empty());
    }
}
