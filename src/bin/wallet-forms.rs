use std::fs::File;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wallet_forms::{
    bin_utils::{Service, csv_parser::NameDirectory, session::ScriptError},
    form::FormConfig,
};

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the tracing subscriber")?;

    let mut args = std::env::args().skip(1);
    let filename = args
        .next()
        .context("Expected an event script as the first argument")?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    let names = match args.next() {
        Some(names_file) => {
            let source = File::open(&names_file)
                .with_context(|| format!("Failed to open `{names_file}`"))?;
            NameDirectory::read(source)
                .with_context(|| format!("Failed to read names from `{names_file}`"))?
        }
        None => NameDirectory::default(),
    };
    if names.is_empty() {
        tracing::info!("no names loaded, name receivers will not resolve");
    } else {
        tracing::info!(names = names.len(), "name directory loaded");
    }

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        names,
        config: FormConfig::default(),
        error_printer: Box::new(|line, err| {
            match err {
                ScriptError::Confirm(err) => {
                    // the form refused, same as a disabled confirm button
                    tracing::info!(line, "confirm refused: {err}")
                }
                err => eprintln!("Error at line {line}: {err}"),
            }
        }),
    };
    service.run()
}
