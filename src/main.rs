use clap::Parser;
use neighborly_wiki::pipeline::{self, BuildOptions};
use neighborly_wiki::{config, output};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "neighborly-wiki")]
#[command(about = "Generate a static HTML wiki from a Neighborly simulation export")]
#[command(long_about = "\
Generate a static HTML wiki from a Neighborly simulation export

Every entity in the export gets its own page; index.html lists them all,
grouped by kind, and kinds/<kind>.html lists each kind.

Template directory:

  templates/
  ├── config.toml                  # Site title, kinds, reference table (optional)
  ├── character.toml               # Page layout for kind `Character`
  ├── residential_building.toml    # Page layout for kind `ResidentialBuilding`
  ├── fallback.toml                # Layout for entities without one
  └── index.toml                   # Home page title and intro

Every file is optional: stock layouts and config are built in, and files
in the template directory replace or extend them.

Set RUST_LOG=info (or debug) for more detail; unresolved references are
reported as warnings.

Run 'neighborly-wiki --print-config' to see a documented config.toml.")]
#[command(version)]
struct Cli {
    /// JSON export of the simulation
    #[arg(required_unless_present = "print_config")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Template directory (page layouts and config.toml)
    #[arg(long, default_value = "templates")]
    templates: PathBuf,

    /// Print a stock config.toml with all options documented, then exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    // Default to "warn" so unresolved references show without RUST_LOG.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }
    let Some(input) = cli.input else {
        // clap enforces the input unless --print-config is given.
        return ExitCode::FAILURE;
    };

    let options = BuildOptions {
        input,
        output: cli.output,
        templates: cli.templates,
    };
    match pipeline::run(&options) {
        Ok(summary) => {
            output::print_build_summary(&summary);
            if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
