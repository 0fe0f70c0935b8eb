//! Skirt/brim CLI - run first-layer adhesion generation on a job file
//!
//! A job file is JSON with the configuration and the first layer:
//!
//! ```json
//! { "config": { "distance": 0, "line_count": 5 }, "layer": { "parts": [ ... ] } }
//! ```
//!
//! Usage:
//!   skirt-brim-cli generate <job.json> -o <out.json> [options]
//!   skirt-brim-cli info <job.json>

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use skirt_brim::clipper::total_area;
use skirt_brim::geometry::get_extents;
use skirt_brim::{
    generate, scale, unscale, AdhesionMode, FirstLayerStore, OffsetJoinType, ShieldKind,
    SkirtBrimConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

/// First-layer skirt and brim generator
#[derive(Parser, Debug)]
#[command(name = "skirt-brim-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate skirt/brim lines and write the resulting layer as JSON
    Generate {
        /// Job file (JSON)
        #[arg(value_name = "JOB")]
        job: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Distance of the first ring in mm (overrides the job)
        #[arg(long)]
        distance: Option<f64>,

        /// Number of primary rings (overrides the job)
        #[arg(long)]
        lines: Option<usize>,

        /// Minimal length of the adhesion extruder's lines in mm (overrides the job)
        #[arg(long)]
        min_length: Option<f64>,

        /// Corner style of rings (square, round, miter)
        #[arg(long)]
        join: Option<String>,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Display information about a job file
    Info {
        /// Job file (JSON)
        #[arg(value_name = "JOB")]
        job: PathBuf,
    },
}

/// A job file: configuration plus first layer.
#[derive(Debug)]
struct Job {
    config: SkirtBrimConfig,
    layer: FirstLayerStore,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Generate {
            job,
            output,
            distance,
            lines,
            min_length,
            join,
            pretty,
        } => cmd_generate(job, output, distance, lines, min_length, join, pretty),
        Commands::Info { job } => cmd_info(job),
    }
}

fn load_job(path: &Path) -> Result<Job> {
    info!("Loading job file: {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file: {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&content).context("Failed to parse job file")?;

    let config = match json.get("config") {
        Some(config) => SkirtBrimConfig::from_json_str(&config.to_string())
            .context("Invalid skirt/brim configuration")?,
        None => SkirtBrimConfig::default(),
    };
    let layer = match json.get("layer") {
        Some(layer) => {
            FirstLayerStore::from_json_str(&layer.to_string()).context("Invalid first layer")?
        }
        None => anyhow::bail!("Job file has no \"layer\" section"),
    };
    Ok(Job { config, layer })
}

fn parse_join_type(join: &str) -> Result<OffsetJoinType> {
    match join.to_lowercase().as_str() {
        "square" => Ok(OffsetJoinType::Square),
        "round" => Ok(OffsetJoinType::Round),
        "miter" | "mitre" => Ok(OffsetJoinType::Miter),
        other => anyhow::bail!("Unknown join type '{}' (expected square, round or miter)", other),
    }
}

fn cmd_generate(
    job_path: PathBuf,
    output: Option<PathBuf>,
    distance: Option<f64>,
    lines: Option<usize>,
    min_length: Option<f64>,
    join: Option<String>,
    pretty: bool,
) -> Result<()> {
    let Job {
        mut config,
        layer: mut store,
    } = load_job(&job_path)?;

    if let Some(distance) = distance {
        config.distance = scale(distance);
    }
    if let Some(lines) = lines {
        config.line_count = lines;
    }
    if let Some(min_length) = min_length {
        let extruder = config.adhesion_extruder;
        if let Some(settings) = config.extruders.get_mut(extruder) {
            settings.minimal_length = scale(min_length);
        }
    }
    if let Some(join) = join {
        config.join_type = parse_join_type(&join)?;
    }
    config.validate().context("Invalid skirt/brim configuration")?;

    info!("Configuration: {}", config);
    generate(&mut store, &config);

    for extruder in 0..store.extruder_count {
        let closed = store.skirt_brim_lines(extruder).len();
        let open = store.skirt_brim_open_lines(extruder).len();
        if closed + open > 0 {
            info!(
                "Extruder {}: {} closed and {} open lines, {:.1}mm",
                extruder,
                closed,
                open,
                unscale(store.extruder_skirt_brim_length(extruder))
            );
        }
    }

    let json = if pretty {
        serde_json::to_string_pretty(&store)?
    } else {
        serde_json::to_string(&store)?
    };

    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn cmd_info(job_path: PathBuf) -> Result<()> {
    let Job { config, layer } = load_job(&job_path)?;

    let outlines: Vec<_> = layer.parts.iter().map(|p| p.outline.clone()).collect();
    let bb = get_extents(&outlines);

    println!("First Layer:");
    println!("  File: {}", job_path.display());
    println!("  Extruders: {}", layer.extruder_count);
    println!("  Parts: {}", layer.parts.len());
    for (extruder, used) in layer.extruders_used().iter().enumerate() {
        if *used {
            let parts = layer.part_outlines(skirt_brim::Extruders::Single(extruder));
            println!(
                "    Extruder {}: {} parts, {:.2} mm²",
                extruder,
                parts.len(),
                total_area(&parts) / 1e6
            );
        }
    }
    if bb.defined {
        println!("  Bounding box:");
        println!("    Min: ({:.3}, {:.3}) mm", unscale(bb.min.x), unscale(bb.min.y));
        println!("    Max: ({:.3}, {:.3}) mm", unscale(bb.max.x), unscale(bb.max.y));
    }
    println!(
        "  Support: {}",
        if layer.has_support() { "yes" } else { "no" }
    );
    println!(
        "  Prime tower: {}",
        if layer.prime_tower.is_some() { "yes" } else { "no" }
    );
    for kind in [ShieldKind::Ooze, ShieldKind::Draft] {
        if layer.shield(kind).is_some() {
            println!("  Shield: {}", kind);
        }
    }

    println!("Adhesion:");
    println!("  Mode: {}", AdhesionMode::from_config(&config));
    println!("  Extruder: {}", config.adhesion_extruder);
    println!("  Distance: {:.3} mm", unscale(config.distance));
    println!("  Lines: {}", config.line_count);
    println!(
        "  Line width: {:.3} mm",
        unscale(config.line_width(config.adhesion_extruder))
    );
    println!(
        "  Minimal length: {:.1} mm",
        unscale(config.extruder(config.adhesion_extruder).minimal_length)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_job(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("skirt-brim-{}-{}.json", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_job_defaults_missing_config() {
        let path = write_job(
            "layer-only",
            r#"{ "layer": { "parts": [ { "extruder": 1, "outline": { "contour":
                [ {"x": 0, "y": 0}, {"x": 1000, "y": 0}, {"x": 1000, "y": 1000} ] } } ] } }"#,
        );
        let job = load_job(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(job.layer.extruder_count, 2);
        assert_eq!(job.config.line_count, SkirtBrimConfig::default().line_count);
    }

    #[test]
    fn test_load_job_requires_layer() {
        let path = write_job("no-layer", r#"{ "config": { "line_count": 3 } }"#);
        let err = load_job(&path).unwrap_err();
        fs::remove_file(&path).unwrap();

        assert!(err.to_string().contains("layer"));
    }

    #[test]
    fn test_parse_join_type() {
        assert_eq!(parse_join_type("Mitre").unwrap(), OffsetJoinType::Miter);
        assert!(parse_join_type("bevel").is_err());
    }
}
