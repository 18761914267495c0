//! CLI module for gm-codegen

mod args;

pub use args::{Args, Command};

use crate::catalog::Catalog;
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::generate::Driver;
use crate::model::{FunctionCategory, ValueType};
use crate::output::{FileSink, TemplateEngine};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the log subscriber; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Generate {
            templates,
            output,
            config,
            exclude,
            format,
            dry_run,
            verbose,
        } => {
            init_logging(verbose);

            // An explicit config file must exist; the default one is optional
            let mut cfg = match config {
                Some(path) if !path.exists() => return Err(Error::PathNotFound(path)),
                Some(path) => Config::load(&path)?,
                None => Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
            };

            cfg.merge_cli(templates, output, exclude, format);
            cfg.validate()?;

            if verbose {
                println!("Templates: {}", cfg.paths.template_dir.display());
                println!("Output: {}", cfg.paths.output_dir.display());
                println!("Exclude: {:?}", cfg.output.exclude);
                println!("Format: {}", cfg.format.enabled);
            }

            let catalog = Catalog::graphics_math()?;
            let engine = TemplateEngine::from_dir(&cfg.paths.template_dir)?;
            info!(
                "Loaded {} templates from {}",
                engine.template_names().count(),
                cfg.paths.template_dir.display()
            );

            let mut driver = Driver::new(engine);
            let generation = driver.run(&catalog)?;
            println!(
                "Generated {} types and {} functions",
                generation.context.type_count(),
                generation.context.function_count()
            );

            let sink = FileSink::new(cfg.sink_config(dry_run, verbose))?;
            let report = sink.write_all(&generation.artifacts)?;

            println!("{}", report.summary());
            if !dry_run {
                println!("Sources written to: {}", sink.output_dir().display());
            }

            Ok(())
        }

        Command::List { json } => {
            let catalog = Catalog::graphics_math()?;
            let listing = Listing::from_catalog(&catalog);

            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print!("{}", listing.to_text());
            }

            Ok(())
        }

        Command::Version => {
            println!("gm-codegen {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Summary of the built-in catalog for `list`
#[derive(Debug, Serialize)]
struct Listing {
    types: Vec<TypeEntry>,
    functions: Vec<FunctionEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TypeEntry {
    name: String,
    category: &'static str,
    header_file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionEntry {
    name: String,
    category: FunctionCategory,
    header_file_name: String,
    overloads: usize,
}

impl Listing {
    fn from_catalog(catalog: &Catalog) -> Self {
        let composites: Vec<ValueType> = catalog
            .types
            .composites
            .iter()
            .cloned()
            .map(ValueType::composite)
            .collect();

        let mut types: Vec<TypeEntry> = Vec::new();
        for ty in catalog.types.declared().chain(composites.iter()) {
            let Some(header) = ty.header_file_name() else {
                continue;
            };
            let name = ty.class_name();
            if types.iter().any(|t| t.name == name) {
                continue;
            }
            types.push(TypeEntry {
                name,
                category: ty.category().as_str(),
                header_file_name: header,
            });
        }

        let functions = catalog
            .groups
            .iter()
            .flat_map(|g| g.functions())
            .map(|f| FunctionEntry {
                name: f.name(),
                category: f.category(),
                header_file_name: f.header_file_name(),
                overloads: f.interfaces().len(),
            })
            .collect();

        Self { types, functions }
    }

    fn to_text(&self) -> String {
        let mut text = String::new();

        text.push_str(&format!("Types ({}):\n", self.types.len()));
        for ty in &self.types {
            text.push_str(&format!(
                "  {:<16} {:<10} {}\n",
                ty.name, ty.category, ty.header_file_name
            ));
        }

        text.push_str(&format!("\nFunctions ({}):\n", self.functions.len()));
        for f in &self.functions {
            text.push_str(&format!(
                "  {:<28} {:<28} {} overloads\n",
                f.name, f.header_file_name, f.overloads
            ));
        }

        text
    }
}
