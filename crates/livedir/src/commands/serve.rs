//! Serve command implementation.

use std::path::PathBuf;

use clap::Args;
use livedir_config::{CliSettings, Config, DEFAULT_PORT};
use livedir_server::{ServerConfig, run_server};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for serving a directory.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Directory to serve (default: current directory).
    root: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover livedir.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to; unusable values fall back to the configured port.
    #[arg(short, long, env = "LIVEDIR_PORT")]
    port: Option<String>,

    /// Disable live reload.
    #[arg(long)]
    no_live_reload: bool,

    /// Enable verbose output (request and socket logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let port = self.resolve_port(&output);
        let cli_settings = CliSettings {
            root_dir: self.root,
            host: self.host,
            port,
            live_reload_enabled: self.no_live_reload.then_some(false),
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(
            root = %config.root_dir.display(),
            ignore = ?config.live_reload.ignore_list(),
            "Configuration loaded"
        );

        output.highlight(&format!(
            "Serving {} on http://{}:{}",
            config.root_dir.display(),
            config.server.host,
            config.server.port
        ));
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }
        if config.live_reload.enabled {
            output.info("Live reload: enabled");
        } else {
            output.info("Live reload: disabled");
        }

        run_server(ServerConfig::from(&config)).await?;

        Ok(())
    }

    /// Parse `--port`, warning about and dropping unusable values.
    fn resolve_port(&self, output: &Output) -> Option<u16> {
        let raw = self.port.as_deref()?;
        let port = parse_port(raw);
        if port.is_none() {
            output.warning(&format!(
                "Ignoring invalid port {raw:?}, using configured port (default {DEFAULT_PORT})"
            ));
        }
        port
    }
}

/// Parse a port number, rejecting 0 and anything that isn't a `u16`.
fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse().ok().filter(|port| *port != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    #[test]
    fn test_parse_port_valid() {
        assert_eq!(parse_port("8080"), Some(8080));
        assert_eq!(parse_port(" 3001 "), Some(3001));
    }

    #[test]
    fn test_parse_port_invalid_falls_back() {
        assert_eq!(parse_port("abc"), None);
        assert_eq!(parse_port(""), None);
        assert_eq!(parse_port("0"), None);
        assert_eq!(parse_port("70000"), None);
        assert_eq!(parse_port("-1"), None);
    }

    #[test]
    fn test_args_accept_invalid_port_string() {
        let cli = TestCli::try_parse_from(["livedir", "-p", "nope", "public"]).unwrap();

        assert_eq!(cli.serve.port.as_deref(), Some("nope"));
        assert_eq!(cli.serve.root, Some(PathBuf::from("public")));
        assert_eq!(cli.serve.resolve_port(&Output::new()), None);
    }

    #[test]
    fn test_args_defaults() {
        let cli = TestCli::try_parse_from(["livedir"]).unwrap();

        assert!(cli.serve.root.is_none());
        assert!(!cli.serve.no_live_reload);
        assert!(!cli.serve.verbose);
    }

    #[test]
    fn test_args_long_flags() {
        let cli = TestCli::try_parse_from([
            "livedir",
            "--port",
            "4000",
            "--host",
            "0.0.0.0",
            "--no-live-reload",
        ])
        .unwrap();

        assert_eq!(cli.serve.resolve_port(&Output::new()), Some(4000));
        assert_eq!(cli.serve.host.as_deref(), Some("0.0.0.0"));
        assert!(cli.serve.no_live_reload);
    }
}
