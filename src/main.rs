//! folio - an interactive portfolio terminal
//!
//! A small command terminal that introduces its owner. Known commands print
//! fixed text or run a built-in action; anything else is forwarded to a
//! question-answering endpoint.
//!
//! # Features
//!
//! - **Commands**: `help`, `about`, `projects`, `experience`, `socials`,
//!   `location`, `whereami`, `quote`, `date`, `matrix`, `clear`
//! - **Assistant**: unmatched input is sent to an HTTP endpoint
//! - **Matrix overlay**: five seconds of falling glyphs
//! - **Experience deck**: card carousel in the header
//! - **Themes**: dark and light, switchable at run time
//!
//! # Quick Start
//!
//! ```text
//! folio                                    # Defaults from ~/.folio/config.toml
//! folio --endpoint http://host:8000/query  # Different assistant
//! folio --theme light --no-location
//! ```
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Enter | Run the line |
//! | Up/Down | Command history |
//! | PageUp/PageDown | Scroll output |
//! | Ctrl+Left/Right | Experience deck |
//! | Ctrl+T | Toggle theme |
//! | Ctrl+C / Ctrl+D | Quit |

mod app;
mod config;
mod core;
mod deck;
mod history;
mod remote;
mod ui;

use std::env;
use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::app::App;
use crate::config::Config;
use crate::core::dispatcher::Services;

/// Command line options; each one overrides the config file
#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    endpoint: Option<String>,
    theme: Option<String>,
    owner: Option<String>,
    config_path: Option<PathBuf>,
    no_location: bool,
}

impl CliOptions {
    fn apply(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.assistant.endpoint = endpoint.clone();
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(owner) = &self.owner {
            config.owner = owner.clone();
        }
        if self.no_location {
            config.location.enabled = false;
        }
    }
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("folio {}", VERSION);
}

fn print_help() {
    eprintln!("folio {} - An interactive portfolio terminal", VERSION);
    eprintln!();
    eprintln!("Usage: folio [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --endpoint <URL>      Assistant endpoint (default http://localhost:8000/query)");
    eprintln!("  --theme <dark|light>  Color scheme");
    eprintln!("  --owner <NAME>        Name shown in the banner and prompt");
    eprintln!("  --config <PATH>       Config file (default ~/.folio/config.toml)");
    eprintln!("  --no-location         Disable the whereami location lookup");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Enter                 Run the command");
    eprintln!("  Up/Down               Command history");
    eprintln!("  PageUp/PageDown       Scroll output");
    eprintln!("  Ctrl+Left/Right       Browse experience cards");
    eprintln!("  Ctrl+T                Toggle theme");
    eprintln!("  Ctrl+C, Ctrl+D        Quit");
    eprintln!();
    eprintln!("Type 'help' inside the terminal for the command list.");
    eprintln!();
    eprintln!("Log file: ~/.folio/folio.log (level from FOLIO_LOG)");
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut i = 1;

    // Value of the option at `i`, advancing past it
    let value = |i: &mut usize, name: &str| -> Result<String, String> {
        *i += 1;
        args.get(*i)
            .cloned()
            .ok_or_else(|| format!("Missing value for {}", name))
    };

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "--endpoint" => {
                options.endpoint = Some(value(&mut i, "--endpoint")?);
            }
            "--theme" => {
                let theme = value(&mut i, "--theme")?.to_lowercase();
                if theme != "dark" && theme != "light" {
                    return Err(format!("Unknown theme: {}. Use dark or light.", theme));
                }
                options.theme = Some(theme);
            }
            "--owner" => {
                options.owner = Some(value(&mut i, "--owner")?);
            }
            "--config" => {
                options.config_path = Some(PathBuf::from(value(&mut i, "--config")?));
            }
            "--no-location" => {
                options.no_location = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Log to `~/.folio/folio.log`; the terminal itself never shows log output
fn init_logging() {
    let log_path = config::folio_dir()
        .map(|dir| dir.join("folio.log"))
        .unwrap_or_else(|| PathBuf::from("folio.log"));

    // Open log file (append mode)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("folio {} starting...", VERSION);

    // Command line args override the config file
    let mut config = match &options.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    options.apply(&mut config);
    info!(
        "Owner: {}, theme: {}, endpoint: {}, location: {}",
        config.owner, config.theme, config.assistant.endpoint, config.location.enabled
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("folio-io")
        .enable_all()
        .build()?;

    let services = Services::from_config(&config)?;
    let mut app = App::new(&config, services, runtime.handle().clone());
    let result = app.run();
    drop(app);

    if let Err(e) = &result {
        error!("Terminal error: {:#}", e);
    }

    // Queries still in flight are abandoned
    runtime.shutdown_background();
    info!("folio exiting");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("folio")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse_args(&args(&[])), Ok(CliOptions::default()));
    }

    #[test]
    fn test_parse_all_options() {
        let options = parse_args(&args(&[
            "--endpoint",
            "http://10.0.0.2:9000/query",
            "--theme",
            "LIGHT",
            "--owner",
            "sam",
            "--config",
            "/tmp/folio.toml",
            "--no-location",
        ]))
        .unwrap();

        assert_eq!(options.endpoint.as_deref(), Some("http://10.0.0.2:9000/query"));
        assert_eq!(options.theme.as_deref(), Some("light"));
        assert_eq!(options.owner.as_deref(), Some("sam"));
        assert_eq!(options.config_path, Some(PathBuf::from("/tmp/folio.toml")));
        assert!(options.no_location);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&["--endpoint"])).is_err());
        assert!(parse_args(&args(&["--theme", "solarized"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_options_override_config() {
        let mut config = Config::default();
        let options = CliOptions {
            endpoint: Some("http://example.test/q".to_string()),
            theme: Some("light".to_string()),
            owner: Some("sam".to_string()),
            config_path: None,
            no_location: true,
        };
        options.apply(&mut config);

        assert_eq!(config.assistant.endpoint, "http://example.test/q");
        assert_eq!(config.get_color_scheme().name, "light");
        assert_eq!(config.owner, "sam");
        assert!(!config.location.enabled);
        // Untouched fields keep their defaults
        assert_eq!(config.assistant.timeout_secs, 30);
    }
}
