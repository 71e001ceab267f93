use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span, warn};

use tabnorm_cli::batch::{BatchOptions, BatchResult, run_batch};
use tabnorm_cli::config::{Config, parse_delimiter, parse_na_values};
use tabnorm_reference::{MemoryStore, ReferenceCache, ReferenceStore, SqliteStore};
use tabnorm_transform::{FallbackMode, KeyMatching, TableNormalizer};

use crate::cli::{FallbackArg, KeyMatchingArg, RunArgs, TreatmentsArgs};
use crate::summary::apply_table_style;

pub fn run_treatments(args: &TreatmentsArgs) -> Result<()> {
    let mut config = Config::from_env().context("load configuration")?;
    if let Some(path) = &args.treatments_file {
        config.treatments_file = Some(path.clone());
    }
    let catalog = config.catalog()?;

    let mut table = Table::new();
    table.set_header(vec!["Column", "Treatment", "Description"]);
    apply_table_style(&mut table);
    for (column, treatment) in catalog.iter() {
        table.add_row(vec![column, treatment.as_str(), treatment.description()]);
    }
    println!("{table}");
    println!(
        "Columns not listed use the '{}' fallback.",
        config.fallback.as_str()
    );
    Ok(())
}

pub fn run_normalize(args: &RunArgs) -> Result<BatchResult> {
    let config = apply_run_args(Config::from_env().context("load configuration")?, args)?;
    let span = info_span!("run", output_dir = %config.output_dir.display());
    let _guard = span.enter();

    let normalizer = TableNormalizer::new(config.normalizer_config()?);
    let store: Box<dyn ReferenceStore> = match &config.reference_db {
        Some(path) => {
            info!(reference_db = %path.display(), "reference enrichment enabled");
            Box::new(SqliteStore::new(path.clone()))
        }
        None => {
            warn!("no reference database configured, enrichment disabled");
            Box::new(MemoryStore::new())
        }
    };
    let mut cache = ReferenceCache::new(store);

    let options = BatchOptions {
        input_dir: config.input_dir.clone(),
        output_dir: config.output_dir.clone(),
        csv: config.csv.clone(),
        output_delimiter: config.output_delimiter,
        dry_run: args.dry_run,
    };
    run_batch(&options, &normalizer, &mut cache)
}

/// Applies command-line flags over the environment configuration.
fn apply_run_args(mut config: Config, args: &RunArgs) -> Result<Config> {
    if let Some(dir) = &args.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(value) = &args.delimiter {
        config.csv.delimiter = parse_delimiter(value).context("invalid --delimiter")?;
    }
    if let Some(value) = &args.na_values {
        config.csv.na_values = parse_na_values(value);
    }
    if let Some(path) = &args.reference_db {
        config.reference_db = Some(path.clone());
    }
    if let Some(path) = &args.treatments_file {
        config.treatments_file = Some(path.clone());
    }
    if let Some(fallback) = args.fallback {
        config.fallback = match fallback {
            FallbackArg::Trim => FallbackMode::Trim,
            FallbackArg::Infer => FallbackMode::Infer,
        };
    }
    if let Some(matching) = args.key_matching {
        config.enrichment.matching = match matching {
            KeyMatchingArg::Exact => KeyMatching::Exact,
            KeyMatchingArg::CaseInsensitive => KeyMatching::CaseInsensitive,
        };
    }
    if args.no_enrichment {
        config.reference_db = None;
    }
    Ok(config)
}
