//! Command-line color matcher for swatch_gradient
//!
//! Loads the catalog (remote feed or snapshot) and prints the closest
//! swatches to a hex color.

use std::sync::Arc;
use std::{env, path::Path, process};

use swatch_gradient::catalog::{MaterialKind, MaterialRegistry};
use swatch_gradient::{Category, EngineConfig, GradientEngine, StaticAllowList};

/// Treats every texture name as a placeable block
struct AnyBlock;

impl MaterialRegistry for AnyBlock {
    fn lookup(&self, _name: &str) -> Option<MaterialKind> {
        Some(MaterialKind::Block)
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config_path = None;
    let mut category = None;
    let mut limit = 10usize;
    let mut json_output = false;
    let mut hex_arg = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--category" if i + 1 < args.len() => {
                category = match args[i + 1].to_ascii_lowercase().as_str() {
                    "building" => Some(Category::Building),
                    "decoration" => Some(Category::Decoration),
                    other => {
                        eprintln!("Unknown category: {}", other);
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--limit" if i + 1 < args.len() => {
                limit = args[i + 1].parse().unwrap_or_else(|_| {
                    eprintln!("Invalid limit: {}", args[i + 1]);
                    process::exit(1);
                });
                i += 1;
            }
            "--json" => json_output = true,
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") && hex_arg.is_none() => hex_arg = Some(arg.to_string()),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(hex) = hex_arg else {
        print_help(&args[0]);
        process::exit(1);
    };

    let config = match config_path {
        Some(path) => EngineConfig::from_json_file(Path::new(&path)).unwrap_or_else(|e| {
            eprintln!("Error loading config {}: {}", path, e);
            process::exit(1);
        }),
        None => EngineConfig::default(),
    };

    let engine = GradientEngine::with_http(config, Arc::new(AnyBlock), Box::new(StaticAllowList::default()));
    if !engine.reload_catalog() {
        eprintln!("No catalog available: fetch failed and no snapshot exists");
        process::exit(2);
    }
    eprintln!(
        "Catalog: {} swatches, version {}, updated {}",
        engine.catalog_size(),
        engine.catalog_version(),
        engine.last_update()
    );

    let matches = match engine.find_matches_hex(&hex, category, limit) {
        Ok(matches) => matches,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if json_output {
        let rows: Vec<_> = matches
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.swatch.catalog_id,
                    "name": m.swatch.display_name,
                    "hex": m.swatch.hex(),
                    "category": m.category().as_str(),
                    "similarity": m.similarity,
                    "delta_e": m.delta_e,
                })
            })
            .collect();
        match serde_json::to_string_pretty(&rows) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing results: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    for (rank, m) in matches.iter().enumerate() {
        println!(
            "{:>2}. {:<32} {}  {:>5.1}%  ΔE {:>5.2} ({:?})",
            rank + 1,
            m.swatch.display_name,
            m.swatch.hex(),
            m.similarity,
            m.delta_e,
            m.perceptual_category()
        );
    }
}

fn print_help(program: &str) {
    eprintln!("Usage: {} <hex-color> [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file>      Engine configuration (JSON)");
    eprintln!("  --category <kind>    building or decoration");
    eprintln!("  --limit <n>          Number of matches (default 10)");
    eprintln!("  --json               Print matches as JSON");
    eprintln!();
    eprintln!("Set RUST_LOG=debug for catalog and cache diagnostics.");
}
