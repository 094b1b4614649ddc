//! depend CLI - Coupling and CodeRank metrics over a code model dump

mod config;
mod input;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use depend_ast::{ArtifactId, CodeModel, ConstantValue, FilterChain, Scope};
use depend_hierarchy::Hierarchy;
use depend_metrics::{
    Analyzer, CodeRankAnalyzer, CouplingAnalyzer, Engine, ProcessListener, TracingListener,
};

use config::Configuration;
use input::load_model;

#[derive(Parser)]
#[command(name = "depend")]
#[command(about = "Static dependency metrics for object-oriented code models", long_about = None)]
struct Cli {
    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: depend.toml or .depend.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run analyzers and print the metrics report as JSON
    Analyze {
        /// Model dump produced by the parser front end
        model: PathBuf,
        /// Analyzer to run, repeatable (coupling, coderank); all by default
        #[arg(short, long = "analyzer")]
        analyzers: Vec<String>,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Print the resolved hierarchy of one type as JSON
    Hierarchy {
        /// Model dump produced by the parser front end
        model: PathBuf,
        /// Qualified type name, e.g. app\User
        name: String,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Configuration::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Commands::Analyze {
            model,
            analyzers,
            pretty,
        } => cmd_analyze(&config, &model, &analyzers, pretty),
        Commands::Hierarchy {
            model,
            name,
            pretty,
        } => cmd_hierarchy(&config, &model, &name, pretty),
    }
}

fn build_analyzer(name: &str, config: &Configuration) -> Result<Box<dyn Analyzer>> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "coupling" => Box::new(CouplingAnalyzer::new()),
        "coderank" => Box::new(CodeRankAnalyzer::new(&config.coderank)?),
        other => bail!("unknown analyzer `{}` (expected coupling or coderank)", other),
    })
}

fn cmd_analyze(config: &Configuration, path: &Path, analyzers: &[String], pretty: bool) -> Result<()> {
    let mut engine = Engine::new();
    engine.set_max_nesting(config.parser.nesting);
    engine.add_filter(config.filter.namespace_filter()?);
    engine.add_listener(Box::new(TracingListener::new()));

    let names: Vec<String> = if analyzers.is_empty() {
        vec!["coupling".to_string(), "coderank".to_string()]
    } else {
        analyzers.to_vec()
    };
    for name in &names {
        engine.add_analyzer(build_analyzer(name, config)?);
    }

    let source = path.display().to_string();
    engine.listeners().start_parse(&source);
    let model = load_model(path, &config.cache)?;
    engine.listeners().end_parse(&source, model.len());

    let report = engine.analyze(&model).context("analysis failed")?;
    info!(nodes = report.nodes.len(), "report ready");
    print_json(&report, pretty)
}

fn cmd_hierarchy(config: &Configuration, path: &Path, name: &str, pretty: bool) -> Result<()> {
    let model = load_model(path, &config.cache)?;
    let filter = FilterChain::new().with(config.filter.namespace_filter()?);
    let scope = Scope::new(&model, &filter).with_max_nesting(config.parser.nesting);
    let hierarchy = Hierarchy::new(scope);

    let id = model
        .lookup_type(name)
        .filter(|&id| scope.accepts(id))
        .ok_or_else(|| anyhow!("type `{}` not found", name))?;
    let names = |ids: Vec<ArtifactId>| -> Vec<String> {
        ids.into_iter().map(|id| model.qualified_name(id)).collect()
    };

    let methods: Vec<_> = hierarchy
        .all_methods(id)?
        .iter()
        .map(|entry| {
            json!({
                "name": entry.name,
                "method": model.qualified_name(entry.method),
                "origin": model.qualified_name(entry.origin),
                "abstract": entry.is_abstract(),
            })
        })
        .collect();
    let constants: Vec<_> = hierarchy
        .constants(id)?
        .into_iter()
        .map(|c| json!({ "name": c.name, "value": constant_json(&c.value) }))
        .collect();

    let output = json!({
        "type": model.qualified_name(id),
        "kind": kind_of(&model, id),
        "parents": names(hierarchy.parent_chain(id)?),
        "interfaces": names(hierarchy.all_interfaces(id)?),
        "methods": methods,
        "constants": constants,
    });
    print_json(&output, pretty)
}

fn kind_of(model: &CodeModel, id: ArtifactId) -> String {
    model
        .get(id)
        .map(|a| a.kind().to_string())
        .unwrap_or_default()
}

fn constant_json(value: &ConstantValue) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
