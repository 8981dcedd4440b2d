use anyhow::{anyhow, Context as _, Result};
use clap::{Parser, Subcommand};
use http::{Method, Request};
use std::io::{self, Write};

use super::demo::demo_app;

/// Command-line interface for switchyard
#[derive(Parser, Debug)]
#[command(name = "switchyard")]
#[command(about = "Inspect route resolution and dispatch on the demo app", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every registered (method, pattern) pair
    Routes,
    /// Resolve METHOD PATH against the route trees and print bound parameters
    Match {
        method: String,
        path: String,
    },
    /// Run a request through the full chain and print the response
    Dispatch {
        method: String,
        /// Path, optionally with a query string
        path: String,

        /// Request header as `name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

/// Parse arguments from the process and run, writing to stdout
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    run(&cli, &mut stdout.lock())
}

/// Run `cli`, writing human-readable output to `out`
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let app = demo_app().context("Failed to build demo routes")?;

    match &cli.command {
        Commands::Routes => {
            for (method, pattern) in app.routes() {
                writeln!(out, "{method:<8} {pattern}")?;
            }
        }
        Commands::Match { method, path } => {
            let method = parse_method(method)?;
            match app.lookup(method.as_str(), path) {
                Some(found) => {
                    writeln!(out, "{} {} -> {}", method, path, found.pattern)?;
                    for (name, value) in found.params.iter() {
                        writeln!(out, "  {name} = {value}")?;
                    }
                    writeln!(out, "  chain: {} handler(s)", found.handlers.len())?;
                }
                None => writeln!(out, "{} {} -> no route", method, path)?,
            }
        }
        Commands::Dispatch {
            method,
            path,
            headers,
            body,
        } => {
            let mut builder = Request::builder().method(parse_method(method)?).uri(path);
            for header in headers {
                let (name, value) = header
                    .split_once(':')
                    .ok_or_else(|| anyhow!("Header must be `name: value`, got {header:?}"))?;
                builder = builder.header(name.trim(), value.trim());
            }
            let request = builder
                .body(body.clone().unwrap_or_default().into_bytes())
                .context("Invalid request")?;

            let response = app.dispatch(request);
            writeln!(out, "HTTP {}", response.status())?;
            for (name, value) in response.headers() {
                writeln!(out, "{}: {}", name, value.to_str().unwrap_or("<binary>"))?;
            }
            writeln!(out)?;
            writeln!(out, "{}", String::from_utf8_lossy(response.body()))?;
        }
    }
    Ok(())
}

fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method {method:?}"))
}
