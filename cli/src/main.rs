// SPDX-License-Identifier: MIT OR Apache-2.0

//! chessnet CLI - patches exported model topologies
//!
//! Rewrites a Keras 3 `model.json` produced by the TF.js converter into the
//! layout the browser runtime loads, and checks already-patched files.

mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chessnet_core::pipeline::{self, PipelineConfig};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "chessnet-cli", about = "Model topology tooling for chessnet", version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a Keras 3 model.json into the legacy TF.js layout
    Migrate(MigrateArgs),
    /// Validate a model.json without changing it
    Check {
        /// model.json to check
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct MigrateArgs {
    /// Exported model.json
    input: PathBuf,

    /// Where to write the result (defaults to rewriting INPUT)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Indent the written JSON
    #[arg(long)]
    pretty: bool,

    /// Migrate and validate without writing
    #[arg(long)]
    dry_run: bool,
}

impl MigrateArgs {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            input_path: self.input,
            output_path: self.output,
            pretty: self.pretty,
            dry_run: self.dry_run,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Check { input } => {
            let layers = pipeline::check(&input)
                .with_context(|| format!("{} is not loadable", input.display()))?;
            println!("OK: {} ({} layers)", input.display(), layers);
        }
        Command::Migrate(args) => {
            let config = args.into_config();
            let report = pipeline::run(&config)
                .with_context(|| format!("failed to patch {}", config.input_path.display()))?;
            print!("{}", render::render_pipeline(&report));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrate_config(args: &[&str]) -> PipelineConfig {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Migrate(args) => args.into_config(),
            other => panic!("expected migrate, got {:?}", other),
        }
    }

    #[test]
    fn migrate_defaults_to_in_place() {
        let config = migrate_config(&["chessnet-cli", "migrate", "public/nn/model.json"]);
        assert_eq!(config.output_path(), std::path::Path::new("public/nn/model.json"));
        assert!(!config.pretty);
        assert!(!config.dry_run);
    }

    #[test]
    fn migrate_flags() {
        let config = migrate_config(&[
            "chessnet-cli",
            "--debug",
            "migrate",
            "model.json",
            "-o",
            "patched.json",
            "--pretty",
            "--dry-run",
        ]);
        assert_eq!(config.output_path(), std::path::Path::new("patched.json"));
        assert!(config.pretty);
        assert!(config.dry_run);
    }

    #[test]
    fn check_subcommand() {
        let cli = Cli::try_parse_from(["chessnet-cli", "check", "model.json", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Command::Check { input } if input == PathBuf::from("model.json")));
    }
}
