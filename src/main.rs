use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use codelink::config::{get_config_path, load_config, save_config, LinkConfig};
use codelink::diagnostics::Severity;
use codelink::metrics::project_complexity;
use codelink::pipeline::{load_fact_model, CodeLink};

/// Reference resolution for declaration fact models.
#[derive(Parser)]
#[command(name = "codelink", about = "Resolve and link references in a fact model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init {
        /// Project path (default: current directory)
        path: Option<String>,
    },
    /// Link a fact model and report the result
    Link {
        /// Fact model JSON file
        facts: PathBuf,
        /// Project path holding the configuration (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
        /// Print the linked model as JSON
        #[arg(short, long)]
        json: bool,
        /// Print every diagnostic
        #[arg(short, long)]
        diagnostics: bool,
        /// Log progress to stderr
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> codelink::errors::Result<()> {
    match cli.command {
        Commands::Init { path } => {
            let project_path = resolve_path(path);
            save_config(&project_path, &LinkConfig::default())?;
            println!(
                "Wrote default configuration to {}",
                get_config_path(&project_path).display()
            );
        }
        Commands::Link {
            facts,
            path,
            json,
            diagnostics,
            verbose,
        } => {
            init_tracing(verbose);
            let project_path = resolve_path(path);
            let config = load_config(&project_path)?;
            let repo = load_fact_model(&facts)?;
            let output = CodeLink::new(config).run(&repo);

            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            let model = &output.model;
            println!("Linked {}", facts.display());
            println!("  Projects:        {}", model.projects().len());
            println!("  Files:           {}", model.files().len());
            println!("  Types:           {}", model.types().len());
            println!("  Methods:         {}", model.methods().len());
            println!("  Created classes: {}", model.created_classes().len());
            println!("  Fingerprint:     {}", model.fingerprint());

            for project in model.projects() {
                if let Some(summary) = project_complexity(model, project.id) {
                    println!(
                        "  {}: complexity max {} min {} sum {} avg {}",
                        project.name, summary.max, summary.min, summary.sum, summary.avg
                    );
                }
            }

            let d = &output.diagnostics;
            println!(
                "\n  Diagnostics: {} errors, {} warnings, {} info",
                d.count(Severity::Error),
                d.count(Severity::Warning),
                d.count(Severity::Info)
            );
            if diagnostics {
                for diagnostic in d.iter() {
                    println!(
                        "    [{}] {}: {}",
                        diagnostic.severity.as_str(),
                        diagnostic.kind.as_str(),
                        diagnostic.message
                    );
                }
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "codelink=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves an optional path string to an absolute `PathBuf`, defaulting to cwd.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => {
            let pb = PathBuf::from(p);
            if pb.is_absolute() {
                pb
            } else {
                std::env::current_dir().unwrap_or_default().join(pb)
            }
        }
        None => std::env::current_dir().unwrap_or_default(),
    }
}
