//! Interactive simulator on top of a line editor

use super::simulator::SimulatorArgs;
use crate::render::ConsoleSink;
use nexus_config::Config;
use nexus_logger as logger;
use rustyline::{error::ReadlineError, DefaultEditor};

const PROMPT: &str = "$ ";

pub async fn handle_shell(args: SimulatorArgs, config: &Config) -> anyhow::Result<()> {
    let mut shell = args.build_shell(config);
    // The editor already shows what was typed
    let mut sink = ConsoleSink::new(false);
    shell.banner(&mut sink);

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "exit" || trimmed == "quit" {
                    break;
                }
                if !trimmed.is_empty() {
                    rl.add_history_entry(trimmed)?;
                }
                shell.handle_line(&line, &mut sink).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted. Press Ctrl-D or type \"exit\" to quit.");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                logger::error(&format!("Failed to read input: {}", err));
                break;
            }
        }
    }

    logger::debug("Simulator session ended");
    Ok(())
}
