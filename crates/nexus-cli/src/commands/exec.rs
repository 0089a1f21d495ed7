//! Non-interactive simulator: every argument is one terminal line

use super::simulator::SimulatorArgs;
use crate::render::ConsoleSink;
use nexus_config::Config;
use nexus_logger as logger;

pub async fn handle_exec(args: SimulatorArgs, lines: Vec<String>, config: &Config) -> anyhow::Result<()> {
    let mut shell = args.build_shell(config);
    let mut sink = ConsoleSink::new(true);

    logger::debug(&format!("Executing {} line(s)", lines.len()));
    for (index, line) in lines.iter().enumerate() {
        logger::step(&format!("Line {}: {}", index + 1, line));
        shell.handle_line(line, &mut sink).await;
    }
    Ok(())
}
