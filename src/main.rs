//! Razor Template CLI
//!
//! Usage:
//!   razor-template [OPTIONS] [TEMPLATE]
//!
//! Options:
//!   -m, --model <FILE>      JSON model to render with
//!   -c, --config <FILE>     Settings file (TOML format)
//!   -b, --binding <NAME>    Model binding name
//!   --no-implicit-scope     Require model properties to be qualified
//!   -e, --emit <WHAT>       output, segments or source
//!   -v, --verbose           Debug logging on stderr
//!   -h, --help              Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};

use razor_template::{compile_with_options, scan, Settings, TemplateError};

#[derive(Parser)]
#[command(name = "razor-template")]
#[command(about = "Compile and render Razor-style templates")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    template: Option<PathBuf>,

    /// JSON file holding the model (an empty object if not provided)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Settings file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name the model is bound to inside the template
    #[arg(short, long)]
    binding: Option<String>,

    /// Do not resolve bare names against the model
    #[arg(long)]
    no_implicit_scope: bool,

    /// What to print
    #[arg(short, long, value_enum, default_value_t = Emit::Output)]
    emit: Emit,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Rendered output
    Output,
    /// Scanned segments as JSON
    Segments,
    /// Generated procedure
    Source,
}

fn main() {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::WARN.into()
            }),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error installing logger: {}", e);
    }

    // Load settings, then let flags override them
    let settings = match &cli.config {
        Some(path) => match Settings::from_file(path) {
            Ok(s) => s,
            Err(e) => fail(&format!("loading settings '{}': {}", path.display(), e)),
        },
        None => Settings::default(),
    };
    let mut options = settings.compile_options();
    if let Some(name) = &cli.binding {
        options = options.with_binding_name(name.clone());
    }
    if cli.no_implicit_scope {
        options = options.with_implicit_scope(false);
    }

    let (source, filename) = read_template(cli.template.as_deref());

    if cli.emit == Emit::Segments {
        let segments = match scan(&source) {
            Ok(segments) => segments,
            Err(e) => {
                eprint!("{}", e.format(&source, &filename));
                process::exit(1);
            }
        };
        match serde_json::to_string_pretty(&segments) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(&format!("serializing segments: {}", e)),
        }
        return;
    }

    let template = match compile_with_options(&source, &options) {
        Ok(template) => template,
        Err(e) => report(e, &source, &filename),
    };

    if cli.emit == Emit::Source {
        println!("{}", template.procedure().function_source());
        return;
    }

    let model = match &cli.model {
        Some(path) => read_model(path),
        None => serde_json::Value::Object(serde_json::Map::new()),
    };
    match template.render(&model) {
        Ok(output) => print!("{}", output),
        Err(e) => report(e, &source, &filename),
    }
}

fn read_template(path: Option<&Path>) -> (String, String) {
    match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => fail(&format!("reading file '{}': {}", path.display(), e)),
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => fail(&format!("reading from stdin: {}", e)),
            }
        }
    }
}

fn read_model(path: &Path) -> serde_json::Value {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail(&format!("reading model '{}': {}", path.display(), e)),
    };
    match serde_json::from_str(&content) {
        Ok(model) => model,
        Err(e) => fail(&format!("parsing model '{}': {}", path.display(), e)),
    }
}

fn report(error: TemplateError, source: &str, filename: &str) -> ! {
    match error {
        TemplateError::Compile(e) => eprint!("{}", e.format(source, filename)),
        TemplateError::Script(e) => eprintln!("Error: {}", e),
    }
    process::exit(1);
}

fn fail(message: &str) -> ! {
    eprintln!("Error {}", message);
    process::exit(1);
}
