//! CLI for preparing markdown documents for PDF rendering.
//!
//! ## Usage
//!
//! ```bash
//! # Convert README_pdf.md into README_build.md (+ assets/diagrams/*.mmd)
//! pdfprep
//!
//! # Convert a specific file
//! pdfprep docs/guide.md --output build/guide.md
//!
//! # Show what would be written without touching the filesystem
//! pdfprep docs/guide.md --dry-run --json
//!
//! # Generate shell completions
//! source <(COMPLETE=bash pdfprep)
//! ```

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueHint};
use clap_complete::Shell;
use color_eyre::eyre::{Result, WrapErr, eyre};
use pdfprep_lib::diagrams::{DEFAULT_ASSETS_DIR, DEFAULT_DIALECT, DEFAULT_WIDTH};
use pdfprep_lib::pipeline::{DEFAULT_INPUT, DEFAULT_OUTPUT};
use pdfprep_lib::{GlyphTable, PrepConfig, PrepReport, run};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Prepare a markdown document for PDF rendering
///
/// Replaces emoji with bracketed tags and moves fenced Mermaid diagrams into
/// sidecar `.mmd` files, leaving SVG image references in their place.
#[derive(Parser, Debug)]
#[command(name = "pdfprep", version, about, long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Markdown document to convert
    #[arg(value_name = "INPUT", default_value = DEFAULT_INPUT, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Where to write the converted document
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT, value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Directory for extracted diagram sources
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ASSETS_DIR, value_hint = ValueHint::DirPath)]
    assets_dir: PathBuf,

    /// Fence info-string that marks a diagram block
    #[arg(long, value_name = "NAME", default_value = DEFAULT_DIALECT)]
    dialect: String,

    /// Width annotation for diagram image references
    #[arg(long, value_name = "WIDTH", default_value = DEFAULT_WIDTH)]
    width: String,

    /// TOML file with additional or replacement glyph → tag mappings
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    glyphs: Option<PathBuf>,

    /// Report what would be written without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const AFTER_HELP: &str = "\
GLYPH TABLES:
  A --glyphs file is TOML. Entries are layered over the built-in table
  unless inherit_defaults = false:

    inherit_defaults = true

    [[glyph]]
    emoji = \"🐛\"
    tag = \"[BUG]\"

SHELL COMPLETIONS:
  Bash (~/.bashrc):
    source <(COMPLETE=bash pdfprep)

  Zsh (~/.zshrc):
    source <(COMPLETE=zsh pdfprep)

  Fish (~/.config/fish/config.fish):
    COMPLETE=fish pdfprep | source

EXAMPLES:
  pdfprep                                # README_pdf.md -> README_build.md
  pdfprep guide.md -o guide.build.md     # Custom input and output
  pdfprep guide.md --assets-dir img      # Diagram sources under img/
  pdfprep guide.md --dry-run --json      # Report only
";

/// Initialize tracing subscriber based on verbosity level.
///
/// Verbosity levels:
/// - 0 (default): no subscriber
/// - 1 (-v): INFO (run summary)
/// - 2 (-vv): DEBUG (per-diagram and per-file events)
/// - 3 (-vvv): TRACE (per-glyph substitutions)
/// - 4+ (-vvvv): TRACE with file/line numbers
fn init_tracing(verbose: u8) {
    if verbose == 0 {
        return;
    }

    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            1 => "warn,pdfprep=info,pdfprep_lib=info".to_string(),
            2 => "warn,pdfprep=debug,pdfprep_lib=debug".to_string(),
            _ => "debug,pdfprep=trace,pdfprep_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose >= 4)
                .with_line_number(verbose >= 4)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> Result<()> {
    // Check for shell completion generation before parsing args
    if let Ok(shell_name) = std::env::var("COMPLETE") {
        return generate_completions(&shell_name);
    }

    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli)?;
    tracing::debug!(?config, "Resolved configuration");

    let report = run(&config)
        .wrap_err_with(|| format!("Failed to prepare {}", cli.input.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &cli.dialect);
    }

    Ok(())
}

/// Maps parsed arguments onto a [`PrepConfig`].
fn build_config(cli: &Cli) -> Result<PrepConfig> {
    let mut config = PrepConfig::new()
        .input(&cli.input)
        .output(&cli.output)
        .assets_dir(&cli.assets_dir)
        .dialect(&cli.dialect)
        .width(&cli.width)
        .dry_run(cli.dry_run);

    if let Some(ref path) = cli.glyphs {
        let table = GlyphTable::load(path)
            .wrap_err_with(|| format!("Failed to load glyph table {}", path.display()))?;
        config = config.glyphs(table);
    }

    Ok(config)
}

/// Prints the output path and, if any, the sidecar paths.
fn print_report(report: &PrepReport, dialect: &str) {
    let verb = if report.dry_run { "WOULD WRITE" } else { "WROTE" };
    println!("{verb} {}", report.output.display());

    if !report.sidecars.is_empty() {
        let files = report
            .sidecars
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{}_FILES {files}", dialect.to_uppercase());
    }
}

/// Generate shell completions and exit.
fn generate_completions(shell_name: &str) -> Result<()> {
    let shell = match shell_name.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        _ => {
            return Err(eyre!(
                "Unknown shell: {shell_name}. Supported: bash, zsh, fish, powershell, elvish"
            ));
        }
    };

    clap_complete::generate(shell, &mut Cli::command(), "pdfprep", &mut io::stdout());
    Ok(())
}
