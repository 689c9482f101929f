use anyhow::Result;
use clap::Parser;
use promptmap::cli::{Cli, Commands};
use promptmap::commands::analyze::{analyze_project, AnalyzeOptions};
use promptmap::commands::init::init_config;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            max_tokens,
            tokenizer,
        } => {
            let results = analyze_project(AnalyzeOptions {
                path,
                format: format.into(),
                output,
                max_tokens,
                tokenizer,
            })?;
            if !results.findings.is_empty() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Init { force } => init_config(force),
    }
}
