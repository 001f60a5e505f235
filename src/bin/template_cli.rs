//! Template Resolver CLI
//!
//! Debugging tool for checking how a phrase resolves against a catalog.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a phrase (catalog file: one template name per line)
//! template_cli resolve "고소작업 계획서 주세요" --catalog templates.txt
//!
//! # Same, with usage counts for tie-breaking and a custom vocabulary
//! template_cli resolve "크레인" --catalog templates.txt --usage usage.json --config config/resolver.yaml
//!
//! # Count each successful resolution in the usage file (created if missing)
//! template_cli resolve "크레인" --catalog templates.txt --usage usage.json --record
//!
//! # List every alias key the catalog generates
//! template_cli aliases --catalog templates.txt -o json
//!
//! # Index statistics and compact-form collisions
//! template_cli stats --catalog templates.txt
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use template_resolver::{
    Catalog, CatalogIndex, Resolution, ResolverConfig, UsageCounts, Vocabulary,
};

#[derive(Parser)]
#[command(name = "template_cli")]
#[command(version)]
#[command(about = "Resolve free-form phrases to canonical template names")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json, text, or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
    Pretty,
}

#[derive(Args)]
struct CatalogArgs {
    /// Catalog file, one template name per line
    #[arg(short, long)]
    catalog: PathBuf,

    /// Vocabulary config (YAML); built-in defaults when absent
    #[arg(long, env = "TEMPLATE_RESOLVER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a phrase to a canonical template name
    Resolve {
        /// Phrase to resolve (reads stdin if not provided)
        query: Option<String>,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Usage counts (JSON object of name → count) for tie-breaking;
        /// a missing file counts as empty
        #[arg(short, long)]
        usage: Option<PathBuf>,

        /// Count a successful resolution in the usage file
        #[arg(long, requires = "usage")]
        record: bool,
    },

    /// List alias keys generated from the catalog
    Aliases {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Show the generating rule and target for each key
        #[arg(long)]
        verbose: bool,
    },

    /// Show index statistics and compact-form collisions
    Stats {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "template_resolver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve {
            query,
            catalog,
            usage,
            record,
        } => cmd_resolve(query, &catalog, usage.as_deref(), record, cli.format),
        Commands::Aliases { catalog, verbose } => cmd_aliases(&catalog, verbose, cli.format),
        Commands::Stats { catalog } => cmd_stats(&catalog, cli.format),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_resolve(
    query: Option<String>,
    args: &CatalogArgs,
    usage_path: Option<&Path>,
    record: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let query = match query {
        Some(q) => q,
        None => read_stdin()?,
    };
    let index = load_index(args)?;
    let usage = match usage_path {
        Some(path) if path.exists() => load_usage(path)?,
        _ => UsageCounts::new(),
    };

    let resolution = index.resolve_with_usage(query.trim_end_matches('\n'), &usage);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        OutputFormat::Text => println!("{}", resolution.output_stem()),
        OutputFormat::Pretty => match &resolution {
            Resolution::Resolved(m) => {
                let mut detail = format!("{:?}", m.stage).to_lowercase();
                if let Some(tie_break) = m.tie_break {
                    detail.push_str(&format!(", tie-break: {:?}", tie_break).to_lowercase());
                }
                if let Some(score) = m.similarity {
                    detail.push_str(&format!(", similarity: {:.3}", score));
                }
                println!("{} {} ({})", "OK".green().bold(), m.name, detail.dimmed());
            }
            Resolution::NotFound(q) => {
                println!("{} no template matches '{}'", "MISS".yellow().bold(), q);
            }
        },
    }

    if let (true, Some(path), Some(name)) = (record, usage_path, resolution.name()) {
        let mut counts = usage;
        counts.record(name);
        save_usage(path, &counts)?;
        tracing::debug!(path = %path.display(), name = %name, "usage recorded");
    }

    Ok(if resolution.is_resolved() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn cmd_aliases(args: &CatalogArgs, verbose: bool, format: OutputFormat) -> Result<ExitCode> {
    let index = load_index(args)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "template_list": index.catalog().names(),
                "alias_keys": index.alias_keys(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text | OutputFormat::Pretty => {
            if verbose {
                let mut entries: Vec<_> = index.aliases().entries().iter().collect();
                entries.sort_by(|a, b| a.key.cmp(&b.key));
                for entry in entries {
                    println!(
                        "{}  →  {}  {}",
                        entry.key,
                        entry.canonical,
                        format!("[{:?}]", entry.rule).dimmed()
                    );
                }
            } else {
                for key in index.alias_keys() {
                    println!("{}", key);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_stats(args: &CatalogArgs, format: OutputFormat) -> Result<ExitCode> {
    let index = load_index(args)?;
    let stats = index.stats();
    let collisions = index.catalog().compact_collisions(index.vocabulary());

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "stats": stats,
                "collisions": collisions,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text | OutputFormat::Pretty => {
            print!("{}", stats);
            for group in &collisions {
                let names: Vec<&str> = group.iter().map(|n| n.as_str()).collect();
                println!("  {} {}", "collision:".yellow(), names.join(" | "));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// HELPERS
// =============================================================================

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read query from stdin")?;
    Ok(buffer)
}

fn load_vocabulary(path: Option<&Path>) -> Result<Vocabulary> {
    let config = match path {
        Some(path) => ResolverConfig::from_file(path)?,
        None => ResolverConfig::default(),
    };
    Ok(config.compile()?)
}

fn load_index(args: &CatalogArgs) -> Result<CatalogIndex> {
    let vocabulary = load_vocabulary(args.config.as_deref())?;
    let content = std::fs::read_to_string(&args.catalog)
        .with_context(|| format!("failed to read catalog {}", args.catalog.display()))?;
    let catalog = Catalog::from_column(content.lines().map(|line| line.trim_end_matches('\r')));
    tracing::info!(
        path = %args.catalog.display(),
        templates = catalog.len(),
        "catalog loaded"
    );
    Ok(CatalogIndex::build(catalog, Arc::new(vocabulary)))
}

fn load_usage(path: &Path) -> Result<UsageCounts> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read usage counts {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid usage counts in {}", path.display()))
}

fn save_usage(path: &Path, usage: &UsageCounts) -> Result<()> {
    let content = serde_json::to_string_pretty(usage)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write usage counts {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_file_round_trip_with_record() {
        let path = std::env::temp_dir().join(format!("template_cli_usage_{}.json", std::process::id()));
        let index = CatalogIndex::with_defaults(["크레인 작업계획서", "크레인 교육일지"]);

        let mut usage = UsageCounts::new();
        let resolution = index.resolve_with_usage("크레인 교육일지", &usage);
        let name = resolution.name().unwrap();
        usage.record(name);
        save_usage(&path, &usage).unwrap();

        let loaded = load_usage(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.get("크레인 교육일지"), 1);
        assert_eq!(
            index.resolve_with_usage("크레인", &loaded).name().map(|n| n.as_str()),
            Some("크레인 교육일지")
        );
    }
}
