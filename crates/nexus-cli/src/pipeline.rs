//! Simulated execution of a bound invocation
//!
//! The stages always run in the same order and never fail. The only
//! suspension points are the configured delays; `StageDelays::none()` makes
//! a run complete without sleeping.

use crate::binding::BoundInvocation;
use crate::events::EventSink;
use chrono::{DateTime, SecondsFormat, Utc};
use nexus_config::Config;
use nexus_manifest::ReturnShape;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Container id reported for every simulated run
pub const CONTAINER_ID: &str = "8f2a1c";
pub const EXIT_SENTINEL: &str = "[nexus] Command finished with exit code 0";
pub const STDOUT_MARKER: &str = "--- CONTAINER STDOUT ---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDelays {
    pub resolve: Duration,
    pub bridge: Duration,
    pub payload: Duration,
}

impl Default for StageDelays {
    fn default() -> Self {
        Self {
            resolve: Duration::from_millis(400),
            bridge: Duration::from_millis(400),
            payload: Duration::from_millis(600),
        }
    }
}

impl StageDelays {
    /// Deterministic mode
    pub fn none() -> Self {
        Self {
            resolve: Duration::ZERO,
            bridge: Duration::ZERO,
            payload: Duration::ZERO,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            resolve: config.resolve_delay(),
            bridge: config.bridge_delay(),
            payload: config.payload_delay(),
        }
    }
}

pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Serialize)]
struct SimulatedPayload<'a> {
    status: &'a str,
    timestamp: String,
    data: PayloadData<'a>,
}

#[derive(Serialize)]
struct PayloadData<'a> {
    message: String,
    input_args: &'a [String],
}

#[derive(Debug, Clone)]
pub struct ExecutionPipeline {
    delays: StageDelays,
    clock: fn() -> DateTime<Utc>,
}

impl Default for ExecutionPipeline {
    fn default() -> Self {
        Self::new(StageDelays::default())
    }
}

impl ExecutionPipeline {
    pub fn new(delays: StageDelays) -> Self {
        Self {
            delays,
            clock: Utc::now,
        }
    }

    /// Replace the timestamp source used in JSON payloads
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Drive every stage for `invocation`, streaming events into `sink`
    pub async fn execute(&self, invocation: &BoundInvocation, sink: &mut dyn EventSink) {
        let command = &invocation.command;
        debug!("Executing {} in {}", command.id, command.runtime);

        sink.info(&format!("[nexus] Resolving runtime for {}...", command.language));
        pause(self.delays.resolve).await;
        sink.info(&format!("[nexus] Using runtime: {}", command.runtime));

        sink.info(&format!("[bridge] Generating {} bridge script...", command.language));
        pause(self.delays.bridge).await;

        sink.info(&format!("[docker] Pulling image {}...", command.runtime));
        sink.info(&format!("[docker] Container started (id: {})", CONTAINER_ID));

        sink.output(STDOUT_MARKER);
        match command.return_shape() {
            ReturnShape::Json => {
                pause(self.delays.payload).await;
                sink.output(&self.json_payload(invocation));
            }
            ReturnShape::File | ReturnShape::Text => {
                sink.output(&text_payload(&command.name));
            }
        }

        sink.success(EXIT_SENTINEL);
        debug!("Finished {}", command.id);
    }

    fn json_payload(&self, invocation: &BoundInvocation) -> String {
        let payload = SimulatedPayload {
            status: "success",
            timestamp: (self.clock)().to_rfc3339_opts(SecondsFormat::Millis, true),
            data: PayloadData {
                message: format!("Executed {} successfully", invocation.command.name),
                input_args: &invocation.flag_tokens,
            },
        };
        serde_json::to_string_pretty(&payload).unwrap_or_else(|_| text_payload(&invocation.command.name))
    }
}

fn text_payload(name: &str) -> String {
    format!("Command {} executed successfully.", name)
}
