//! causalid CLI - identify causal effects in a graph description file
//!
//! Usage:
//!   causalid <file> --list-nodes                      # Validate and list nodes
//!   causalid <file> -t X -y Y                         # ID algorithm
//!   causalid <file> -t X -y Y --method backdoor --style all -o json

use causalid_core::engine::model::{CausalModel, Identification, IdentifyMethod, ModelConfig};
use causalid_core::{display_vars, graph_from_source, var_set, AdjustmentConfig, CausalGraph, VarSet};
use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "causalid")]
#[command(version)]
#[command(about = "causalid - causal effect identification CLI")]
#[command(long_about = "Identify interventional distributions and adjustment sets in causal graphs with latent confounders")]
struct Cli {
    /// Input graph description file
    #[arg(value_name = "FILE")]
    file: String,

    /// Treatment variables, comma separated
    #[arg(short, long, value_name = "VARS", value_delimiter = ',')]
    treatment: Vec<String>,

    /// Outcome variables, comma separated
    #[arg(short = 'y', long, value_name = "VARS", value_delimiter = ',')]
    outcome: Vec<String>,

    /// Identification method: default, backdoor or frontdoor
    #[arg(short, long, default_value = "default", value_name = "METHOD")]
    method: String,

    /// Adjustment-set style: simple, minimal or all
    #[arg(short, long, default_value = "simple", value_name = "STYLE")]
    style: String,

    /// Largest candidate adjustment set to consider
    #[arg(long, value_name = "N")]
    max_set_size: Option<usize>,

    /// Output format: summary, json, or debug
    #[arg(short, long, default_value = "summary", value_name = "FORMAT")]
    output: String,

    /// List observed and latent nodes instead of identifying
    #[arg(short, long)]
    list_nodes: bool,

    /// Log engine decisions to stderr (RUST_LOG overrides the level)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let source = match std::fs::read_to_string(&cli.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", cli.file, e);
            process::exit(1);
        }
    };

    let graph = match graph_from_source(&source) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Parse/validation error: {}", e);
            process::exit(1);
        }
    };

    if cli.list_nodes {
        print_nodes(&cli.file, &graph);
        return;
    }

    if cli.treatment.is_empty() || cli.outcome.is_empty() {
        println!("✓ Graph validated successfully");
        println!(
            "  {} observed nodes, {} edges, {} latent confounders",
            graph.nodes().len(),
            graph.edge_count(),
            graph.latents().len()
        );
        println!("\nRun with -t <treatment> -y <outcome> to identify an effect");
        return;
    }

    let method = match IdentifyMethod::parse(&cli.method, &cli.style) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let config = ModelConfig {
        adjustment: AdjustmentConfig {
            max_candidate_size: cli.max_set_size,
            ..AdjustmentConfig::default()
        },
        ..ModelConfig::default()
    };
    let model = match CausalModel::with_config(graph, config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let treatment: VarSet = var_set(cli.treatment.iter().map(String::as_str));
    let outcome: VarSet = var_set(cli.outcome.iter().map(String::as_str));

    match model.identify(&treatment, &outcome, method) {
        Ok(result) => match cli.output.as_str() {
            "json" => match serde_json::to_string_pretty(&format_identification(method, &result)) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing to JSON: {}", e);
                    process::exit(1);
                }
            },
            "debug" => {
                println!("{:#?}", result);
            }
            _ => {
                print_summary(method, &result);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn print_nodes(file: &str, graph: &CausalGraph) {
    println!("Observed nodes in '{}':", file);
    for node in graph.topological_order() {
        let parents = graph.parents(node.name());
        if parents.is_empty() {
            println!("  - {}", node);
        } else {
            println!("  - {} <- {}", node, display_vars(parents));
        }
    }
    if !graph.latents().is_empty() {
        println!("\nLatent confounders:");
        for (latent, children) in graph.latents() {
            println!("  - {} -> {}", latent, display_vars(children));
        }
    }
}

fn print_summary(method: IdentifyMethod, result: &Identification) {
    println!("✓ Identified with {}\n", method);
    if let Some(adjustment) = result.adjustment() {
        let sets = adjustment.sets.sets();
        println!("Adjustment sets ({}):", sets.len());
        for set in sets {
            println!("  {{{}}}", display_vars(set));
        }
        println!();
    }
    println!("Estimand:\n  {}", result.prob());
}

/// Format an identification result for JSON serialization
fn format_identification(method: IdentifyMethod, result: &Identification) -> serde_json::Value {
    use serde_json::json;
    json!({
        "method": method.to_string(),
        "estimand": result.prob().to_string(),
        "expression": result.prob(),
        "adjustment": result.adjustment().map(|a| &a.sets),
    })
}
