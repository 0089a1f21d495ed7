use clap::{Parser, Subcommand};
use nexus::{
    commands::{
        analyze::{self, AnalyzeCommand},
        config::{self, ConfigAction},
        exec, scaffold,
        shell::handle_shell,
        simulator::SimulatorArgs,
        validate,
    },
    GlobalOpts,
};
use nexus_config::Config;
use nexus_logger as logger;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nexus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Command manifest toolkit and terminal simulator",
    long_about = "Nexus turns source code into validated command manifests and lets you exercise them in a simulated CLI."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the nexus tool
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Start the interactive terminal simulator
    Shell(SimulatorArgs),
    /// Run terminal lines through the simulator and print the transcript
    Exec {
        #[command(flatten)]
        simulator: SimulatorArgs,
        /// Lines to run in order, e.g. "nexus login nxs_key"
        #[arg(required = true, value_name = "LINE")]
        lines: Vec<String>,
    },
    /// Validate a manifest file
    Validate {
        file: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write an empty manifest to start editing from
    Scaffold {
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
        #[arg(long, value_name = "NS")]
        namespace: Option<String>,
    },
    /// Produce a candidate manifest from a source file with an external analyzer
    Analyze {
        source: PathBuf,
        /// Analyzer program; reads the request on stdin, prints manifest JSON
        #[arg(long, value_name = "PROGRAM")]
        producer: String,
        /// Extra argument for the analyzer (repeatable)
        #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
        producer_args: Vec<String>,
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logger::verbosity_to_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            logger::warn(&format!("Failed to load config, using defaults: {}", e));
            Config::default()
        }
    }
}

async fn dispatch(command: Commands, global: &GlobalOpts) -> anyhow::Result<bool> {
    match command {
        Commands::Config { action } => config::handle_config(action, global)?,
        Commands::Shell(simulator) => handle_shell(simulator, &load_config()).await?,
        Commands::Exec { simulator, lines } => exec::handle_exec(simulator, lines, &load_config()).await?,
        Commands::Validate { file, json } => return validate::handle_validate(&file, json),
        Commands::Scaffold { output, namespace } => scaffold::handle_scaffold(output, namespace)?,
        Commands::Analyze {
            source,
            producer,
            producer_args,
            output,
        } => {
            analyze::handle_analyze(AnalyzeCommand {
                source,
                producer,
                producer_args,
                output,
            })
            .await?;
        }
    }
    Ok(true)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.quiet) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            logger::error(&format!("Failed to start async runtime: {}", e));
            std::process::exit(1);
        }
    };

    match runtime.block_on(dispatch(cli.command, &cli.global)) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            logger::error(&format!("{:#}", e));
            logger::show_log_path();
            std::process::exit(1);
        }
    }
}
