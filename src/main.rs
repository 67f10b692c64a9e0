//! cellmark - Main Entry Point
//!
//! Renders a worksheet cell file (or standard input) to HTML.

use cellmark::config::{load_config, load_config_from, save_config, save_config_to, Settings};
use cellmark::error::{Error, Result};
use cellmark::export::{export_to_html_file, generate_html_document};
use cellmark::markdown::{render_cell, CellRender};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "Render Markdown worksheet cells with embedded math", long_about = None)]
struct Cli {
    /// Cell source file; standard input if omitted
    file: Option<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write output here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Wrap the fragment in a complete HTML document
    #[arg(long)]
    standalone: bool,

    /// Document title for --standalone
    #[arg(long)]
    title: Option<String>,

    /// Exit with an error if any math region could not be handled
    #[arg(long)]
    strict: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the placeholder text and extracted math regions as JSON
    Extract {
        /// Cell source file; standard input if omitted
        file: Option<PathBuf>,
    },
    /// Write the default settings to the config file
    InitConfig {
        /// Destination (defaults to the user config directory)
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config(),
    };

    match &cli.command {
        Some(Commands::Extract { file }) => {
            let source = read_source(file.as_deref())?;
            let outcome = settings.codec().extract(&source);
            if !outcome.is_complete() {
                warn!("Extraction stopped early at an unterminated math region");
            }
            let json = serde_json::to_string_pretty(outcome.extraction())?;
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::InitConfig { path }) => {
            match path {
                Some(path) => save_config_to(path, &Settings::default())?,
                None => save_config(&Settings::default())?,
            }
            Ok(ExitCode::SUCCESS)
        }
        None => render(&cli, &settings),
    }
}

fn render(cli: &Cli, settings: &Settings) -> Result<ExitCode> {
    let render = match (cli.standalone, cli.file.as_deref(), cli.output.as_deref()) {
        (true, Some(file), Some(output)) => {
            export_to_html_file(file, output, cli.title.as_deref(), settings)?
        }
        _ => render_to_output(cli, settings)?,
    };

    for diagnostic in &render.diagnostics {
        warn!("{}", diagnostic);
    }

    if cli.strict && !render.is_clean() {
        return Err(Error::Application(format!(
            "{} math diagnostic(s) reported in strict mode",
            render.diagnostics.len()
        )));
    }
    Ok(ExitCode::SUCCESS)
}

fn render_to_output(cli: &Cli, settings: &Settings) -> Result<CellRender> {
    let source = read_source(cli.file.as_deref())?;
    let render = render_cell(&source, &settings.render, &settings.codec());

    let html = if cli.standalone {
        let title = cli.title.as_deref().or_else(|| {
            cli.file
                .as_deref()
                .and_then(|p| p.file_stem())
                .and_then(|s| s.to_str())
        });
        generate_html_document(&render.html, title, &settings.export)
    } else {
        render.html.clone()
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &html).map_err(|e| Error::FileWrite {
                path: path.clone(),
                source: e,
            })?;
            info!("Wrote {}", path.display());
        }
        None => io::stdout().write_all(html.as_bytes())?,
    }

    Ok(render)
}

fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        }),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}
