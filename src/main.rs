mod annotate;
mod config;
mod data;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use annotate::process_comparison;
use config::Config;
use data::orthogroups::ReferenceError;

#[derive(Debug, Parser)]
#[command(name = "ortholog-annotate", version)]
#[command(about = "Keep padj < 0.05 rows of DE tables and add Arabidopsis orthologs, one workbook per comparison")]
struct Args {
    /// JSON job file, relative to the current directory; without it the
    /// six built-in comparisons run.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory relative paths are resolved against.
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Print the effective job list as JSON and exit.
    #[arg(long = "print-config")]
    print_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    if args.print_config {
        let json = serde_json::to_string_pretty(&config).context("serializing config")?;
        println!("{json}");
        return Ok(());
    }

    let config = config.rooted_at(&args.dir);
    let written = run_comparisons(&config)?;
    info!(
        "{} of {} comparisons written",
        written,
        config.comparisons.len()
    );
    Ok(())
}

/// The job file as given (not under `--dir`), or the built-in job list.
fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::from_path(path),
        None => Ok(Config::default()),
    }
}

/// Run every comparison in order and return how many workbooks were written.
/// A comparison whose reference lacks a required column is logged and
/// skipped; any other error stops the run.
fn run_comparisons(config: &Config) -> Result<usize> {
    let mut written = 0;

    for comparison in &config.comparisons {
        info!("processing {}", comparison.input_dir.display());
        match process_comparison(comparison, comparison.reference_or(&config.reference)) {
            Ok(_) => written += 1,
            Err(e) if e.downcast_ref::<ReferenceError>().is_some() => {
                error!("skipping {}: {e:#}", comparison.input_dir.display());
            }
            Err(e) => {
                return Err(e.context(format!(
                    "processing {}",
                    comparison.input_dir.display()
                )))
            }
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Comparison, ReferenceSettings};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const REFERENCE: &str = "arabidopsis,bidensv5_hap1_soft_transdecoder\nAT1G01010,geneA123.p1\n";

    fn comparison(root: &Path, name: &str, table: &str) -> Comparison {
        let input = root.join(name);
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("cmp.csv"), table).unwrap();
        Comparison {
            input_dir: input,
            output: root.join(format!("{name}.xlsx")),
            reference: None,
        }
    }

    fn reference(root: &Path, file: &str, body: &str) -> ReferenceSettings {
        let path = root.join(file);
        fs::write(&path, body).unwrap();
        ReferenceSettings {
            path,
            ..ReferenceSettings::default()
        }
    }

    #[test]
    fn bad_reference_skips_only_that_comparison() {
        let dir = tempdir().unwrap();
        let mut broken = comparison(dir.path(), "IvII", ",padj\ngeneA123,0.01\n");
        broken.reference = Some(reference(
            dir.path(),
            "no_lookup.csv",
            "arabidopsis,other_species\nAT1,x\n",
        ));
        let fine = comparison(dir.path(), "IvIII", ",padj\ngeneA123,0.01\n");
        let cfg = Config {
            reference: reference(dir.path(), "orthogroups.csv", REFERENCE),
            comparisons: vec![broken.clone(), fine.clone()],
        };

        assert_eq!(run_comparisons(&cfg).unwrap(), 1);
        assert!(!broken.output.exists());
        assert!(fine.output.exists());
    }

    #[test]
    fn config_path_is_not_under_base_dir() {
        // cargo runs tests from the package root
        let jobs = tempfile::Builder::new()
            .suffix(".json")
            .tempfile_in(".")
            .unwrap();
        fs::write(jobs.path(), r#"{ "comparisons": [] }"#).unwrap();
        let name = jobs.path().file_name().unwrap().to_owned();

        let base = tempdir().unwrap();
        let args = Args {
            config: Some(PathBuf::from(name)),
            dir: base.path().to_path_buf(),
            print_config: false,
        };
        let cfg = load_config(&args).unwrap();
        assert!(cfg.comparisons.is_empty());
    }

    #[test]
    fn missing_padj_stops_the_run() {
        let dir = tempdir().unwrap();
        let bad = comparison(dir.path(), "IvII", ",pvalue\ngeneA123,0.01\n");
        let later = comparison(dir.path(), "IvIII", ",padj\ngeneA123,0.01\n");
        let cfg = Config {
            reference: reference(dir.path(), "orthogroups.csv", REFERENCE),
            comparisons: vec![bad, later.clone()],
        };

        assert!(run_comparisons(&cfg).is_err());
        assert!(!later.output.exists());
    }
}
