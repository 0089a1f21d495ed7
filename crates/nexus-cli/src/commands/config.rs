use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use nexus_config::{Config, ConfigError};
use nexus_logger as logger;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    Show,
    Set {
        key: String,
        value: String,
    },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, it is written to a pointer file next to the
    /// default config location. Otherwise the current path is printed.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), ConfigError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path { new_path } => {
            let config_path = Config::path();
            logger::debug(&format!("Reading config from: {}", config_path.display()));

            match (new_path, Config::pointer_path()) {
                (Some(p), Some(pointer_path)) => {
                    if let Some(parent) = pointer_path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&pointer_path, p.as_bytes())?;
                    logger::success(&format!("Config path set to {}", p));
                }
                (Some(_), None) => {
                    logger::error("Could not determine where to store the config pointer");
                }
                (None, pointer_path) => {
                    println!("{}", config_path.display());

                    let pointed = pointer_path
                        .and_then(|pointer| std::fs::read_to_string(pointer).ok())
                        .map(|contents| contents.trim().to_string())
                        .filter(|contents| !contents.is_empty());
                    if let Some(target) = pointed {
                        println!("{} {}", "overridden-by".cyan(), target);
                    }
                }
            }
        }
    }
    Ok(())
}
