//! docnorm CLI - official-document formatting normalizer

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use docnorm::{diagnose, fix_punctuation, normalize, Document, EngineConfig, Issue, Severity};

#[derive(Parser)]
#[command(name = "docnorm")]
#[command(version)]
#[command(about = "Normalize document punctuation, fonts, layout, and tables", long_about = None)]
struct Cli {
    /// Input document (JSON document model)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report issues without modifying the document
    Check {
        /// Input document (JSON document model)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Apply every rule and write the fixed document
    Fix {
        /// Input document (JSON document model)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to <stem>_fixed.json, never the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Fix punctuation only, leaving layout and fonts alone
    Punct {
        /// Input document (JSON document model)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to <stem>_fixed.json, never the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Some(Commands::Check { input }) => cmd_check(&input, config),
        Some(Commands::Fix { input, output }) => cmd_fix(&input, output.as_deref(), config, false),
        Some(Commands::Punct { input, output }) => {
            cmd_fix(&input, output.as_deref(), config, true)
        }
        None => {
            // Default behavior: check if input is provided
            if let Some(input) = cli.input {
                cmd_check(&input, config)
            } else {
                println!("{}", "Usage: docnorm <FILE>".yellow());
                println!("       docnorm --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_document(path: &Path) -> Result<Document, Box<dyn std::error::Error>> {
    let data = fs::read_to_string(path)?;
    let document = serde_json::from_str(&data)?;
    Ok(document)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let data = fs::read_to_string(p)?;
            Ok(serde_json::from_str(&data)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn print_issues(issues: &[Issue]) {
    for issue in issues {
        let tag = match issue.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };
        let marker = if issue.fixable {
            "fixable".green()
        } else {
            "report-only".dimmed()
        };
        println!(
            "{} [{:?}] {} ({}): {}",
            tag, issue.kind, issue.location, marker, issue.detail
        );
    }
}

fn print_summary(issues: &[Issue]) {
    let fixable = issues.iter().filter(|i| i.fixable).count();
    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    if issues.is_empty() {
        println!("{}", "No issues found".green().bold());
    } else {
        println!(
            "\n{} issue(s): {} fixable, {} error(s)",
            issues.len().to_string().bold(),
            fixable,
            errors
        );
    }
}

fn cmd_check(input: &Path, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let document = load_document(input)?;
    let config = load_config(config)?;

    let issues = diagnose(&document, &config)?;
    print_issues(&issues);
    print_summary(&issues);

    if issues.iter().any(|i| i.severity == Severity::Error) {
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_fix(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    punctuation_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = load_document(input)?;
    let config = load_config(config)?;

    let outcome = if punctuation_only {
        fix_punctuation(document, &config)?
    } else {
        normalize(document, &config)?
    };
    print_issues(&outcome.issues);
    print_summary(&outcome.issues);

    let output_path = output.map(Path::to_path_buf).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        input.with_file_name(format!("{}_fixed.json", stem))
    });
    // The input is the source of truth until the user says otherwise.
    if output_path == input {
        return Err("refusing to overwrite the input file, pass -o with a different path".into());
    }

    log::debug!("writing fixed document to {}", output_path.display());
    let json = serde_json::to_string_pretty(&outcome.document)?;
    fs::write(&output_path, json)?;
    println!("{} {}", "Saved to".green(), output_path.display());
    Ok(())
}
