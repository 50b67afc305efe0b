mod tables;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use pullcalc_engine::{EngineConfig, PullEngine, ResourceId};
use tables::{write_debug_table, write_joint_table, write_level_table};
use util::{ExportStage, parse_stages};

#[derive(Debug, Parser)]
#[command(name = "pullcalc", version)]
#[command(about = "Exact pull-count probability tables for soft-pity gacha resources")]
struct Args {
    /// Stages to compute and export (comma-separated: primary, secondary, joint, all)
    #[arg(long, default_value = "all")]
    compute: String,

    /// Directory that receives the exported tables
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// JSON engine configuration; the built-in presets are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write `<label>-debug.tsv` with hazards and first-occurrence values
    #[arg(long)]
    debug_tables: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    announce_banner();

    let stages = parse_stages(&args.compute)?;
    let config = load_config(args.config.as_deref())?;
    let mut engine = PullEngine::new(config).context("invalid engine configuration")?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let start_time = Instant::now();
    for stage in &stages {
        export_stage(&mut engine, *stage, &args.out_dir)?;
    }
    if args.debug_tables {
        export_debug_tables(&engine, &args.out_dir)?;
    }

    println!(
        "{} {} stage(s) in {:.2}s",
        "✅ Exported".green().bold(),
        stages.len(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn announce_banner() {
    println!("{}", "🎲 Pullcalc Table Exporter".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        log::info!("using built-in presets");
        return Ok(EngineConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    log::info!("loaded configuration from {}", path.display());
    Ok(config)
}

fn create_table(dir: &Path, name: &str) -> Result<BufWriter<File>> {
    let path = dir.join(name);
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn export_stage(engine: &mut PullEngine, stage: ExportStage, dir: &Path) -> Result<()> {
    let name = stage.file_name();
    let mut out = create_table(dir, name)?;
    let written = match stage {
        ExportStage::Primary | ExportStage::Secondary => {
            let resource = if stage == ExportStage::Primary {
                ResourceId::Primary
            } else {
                ResourceId::Secondary
            };
            let tables = engine
                .compute_resource(resource)
                .with_context(|| format!("computing {resource} levels"))?;
            write_level_table(&mut out, tables.levels())
        }
        ExportStage::Joint => {
            let joint = engine.compute_joint().context("computing joint levels")?;
            write_joint_table(&mut out, joint)
        }
    };
    written.with_context(|| format!("failed to write {name}"))?;
    out.flush().with_context(|| format!("failed to flush {name}"))?;
    println!("  {} {}", "wrote".dimmed(), dir.join(name).display());
    Ok(())
}

fn export_debug_tables(engine: &PullEngine, dir: &Path) -> Result<()> {
    for resource in [ResourceId::Primary, ResourceId::Secondary] {
        let Some(tables) = engine.resource(resource) else {
            log::debug!("{resource} not computed; skipping debug table");
            continue;
        };
        let name = format!("{}-debug.tsv", tables.label());
        let mut out = create_table(dir, &name)?;
        write_debug_table(&mut out, tables).with_context(|| format!("failed to write {name}"))?;
        out.flush().with_context(|| format!("failed to flush {name}"))?;
        println!("  {} {}", "wrote".dimmed(), dir.join(&name).display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_default_to_all_stages() {
        let args = Args::try_parse_from(["pullcalc"]).unwrap();
        assert_eq!(args.compute, "all");
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert!(args.config.is_none());
        assert!(!args.debug_tables);
    }

    #[test]
    fn args_accept_every_flag() {
        let args = Args::try_parse_from([
            "pullcalc",
            "--compute",
            "primary,joint",
            "--out-dir",
            "tables",
            "--config",
            "engine.json",
            "--debug-tables",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.compute, "primary,joint");
        assert_eq!(args.out_dir, PathBuf::from("tables"));
        assert_eq!(args.config, Some(PathBuf::from("engine.json")));
        assert!(args.debug_tables);
        assert!(args.verbose);
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = load_config(Some(Path::new("/nonexistent/pullcalc.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/pullcalc.json"));
    }

    #[test]
    fn no_config_path_uses_presets() {
        assert_eq!(load_config(None).unwrap(), EngineConfig::default());
    }
}
