use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use refrax::config::Settings;
use refrax::diagnostics::check_tree;
use refrax::loader::FsLoader;
use refrax::registry::{FragmentRegistry, Reference};

#[derive(Parser)]
#[command(name = "refrax", version, about = "Resolve $ref graphs in JSON/YAML document sets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a coordinate in a document and print it as JSON
    Resolve {
        /// The root document
        file: PathBuf,
        /// Slash-separated pointer below the document root
        #[arg(long, default_value = "/")]
        pointer: String,
    },
    /// Check every document under a directory for broken references
    Check {
        /// Base directory of the document tree
        dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Resolve { file, pointer } => resolve(&file, &pointer),
        Command::Check { dir } => check(&dir),
    }
}

fn resolve(file: &PathBuf, pointer: &str) -> anyhow::Result<()> {
    let base_dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let document = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(anyhow!("Can't determine document name from {file:?}"))?;

    let settings = Settings::new(&base_dir)?;
    let registry = FragmentRegistry::with_settings(FsLoader::new(&base_dir), settings);

    let reference = Reference::root(document).resolve(&format!("#{pointer}"));
    let fragment = registry
        .get(&reference)
        .with_context(|| format!("resolving {reference}"))?;

    println!("{}", serde_json::to_string_pretty(&fragment.value().to_json())?);
    Ok(())
}

fn check(dir: &PathBuf) -> anyhow::Result<()> {
    let settings = Settings::new(dir)?;
    let report = check_tree(dir, &settings);

    for diagnostic in &report.diagnostics {
        match &diagnostic.target {
            Some(target) => eprintln!(
                "{}: broken reference '{}': {}",
                diagnostic.reference, target, diagnostic.error
            ),
            None => eprintln!("{}: {}", diagnostic.reference, diagnostic.error),
        }
    }

    if report.is_clean() {
        println!("{} documents checked, no broken references", report.documents_checked);
        Ok(())
    } else {
        Err(anyhow!(
            "{} broken reference(s) across {} document(s)",
            report.diagnostics.len(),
            report.documents_checked
        ))
    }
}
