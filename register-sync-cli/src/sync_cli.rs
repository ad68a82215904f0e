//! `sync`, `list` and `config` command implementations

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::{debug, info, warn};

use register_sync_core::{
    CatalogClient, CkanClient, DryRunCatalog, RecordTransformer, Reconciler, RegisterFetcher,
    SyncConfig, SyncReport, Synchronizer,
};

/// Settings that override the configuration file
#[derive(Parser, Debug, Default)]
pub struct Overrides {
    /// Only mirror registers in this phase (e.g., alpha, beta, live)
    #[clap(long)]
    phase: Option<String>,

    /// Register index URL
    #[clap(long)]
    source_url: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut SyncConfig) {
        if let Some(phase) = &self.phase {
            config.phase = phase.clone();
        }
        if let Some(url) = &self.source_url {
            config.source_url = url.clone();
        }
    }
}

#[derive(Parser, Debug)]
pub struct SyncArgs {
    #[clap(flatten)]
    overrides: Overrides,

    /// CKAN base URL
    #[clap(long)]
    catalog_url: Option<String>,

    /// Renames attempted before a register is reported as failed
    #[clap(long)]
    max_renames: Option<u32>,

    /// Search the catalog but do not create anything
    #[clap(long)]
    dry_run: bool,

    /// Output the report as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    #[clap(flatten)]
    overrides: Overrides,

    /// Output drafts as JSON
    #[clap(long)]
    json: bool,
}

/// Load the config file, using the platform default location when none is given
pub fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            SyncConfig::load_from_path(path)
        }
        None => match SyncConfig::default_path() {
            Ok(path) => SyncConfig::load_from_path(&path),
            Err(e) => {
                debug!("No default config location ({e:#}), using defaults");
                Ok(SyncConfig::default())
            }
        },
    }
}

/// Transformer using the built-in organisation table plus configured renames
fn transformer(config: &SyncConfig) -> RecordTransformer {
    if !config.organisations.is_empty() {
        debug!(
            "Applying {} organisation renames from config",
            config.organisations.len()
        );
    }
    RecordTransformer::new(config.organisation_map(), &config.license_id)
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Register")]
    register: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

#[derive(Tabled)]
struct DraftRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Organisation")]
    owner_org: String,
}

pub async fn sync_command(mut config: SyncConfig, args: SyncArgs) -> Result<()> {
    args.overrides.apply(&mut config);
    if let Some(url) = args.catalog_url {
        config.catalog_url = url;
    }
    if let Some(max_renames) = args.max_renames {
        config.max_renames = max_renames;
    }

    let api_key = config.api_key();
    if api_key.is_none() && !args.dry_run {
        warn!(
            "{} is not set; the catalog may reject creates",
            config.api_key_env
        );
    }

    let ckan: Arc<dyn CatalogClient> = Arc::new(
        CkanClient::new(&config.catalog_url, api_key, config.timeout())
            .context("Failed to set up catalog client")?,
    );
    let catalog: Arc<dyn CatalogClient> = if args.dry_run {
        info!("Dry run: no catalog entries will be created");
        Arc::new(DryRunCatalog::new(ckan))
    } else {
        ckan
    };

    let fetcher = RegisterFetcher::new(&config.source_url, config.timeout())?;
    let records = fetcher
        .fetch(&config.phase)
        .await
        .with_context(|| format!("Could not read the register index at {}", fetcher.url()))?;
    info!(
        "{} registers in phase '{}' ({} in other phases)",
        records.len(),
        config.phase,
        records.filtered_out()
    );

    let reconciler = Reconciler::new(catalog, config.max_renames);
    debug!("Giving up on a register after {} renames", reconciler.max_renames());

    let synchronizer = Synchronizer::new(transformer(&config), reconciler);
    let report = synchronizer.run(records).await;

    print_report(&report, args.json)?;

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &SyncReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let rows: Vec<OutcomeRow> = report
        .records
        .iter()
        .map(|r| OutcomeRow {
            register: r.register.clone(),
            outcome: r.result.label().to_string(),
            detail: r.result.detail(),
        })
        .collect();

    if rows.is_empty() {
        println!("No registers to synchronize.");
        return Ok(());
    }

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");

    let summary = report.summary();
    println!(
        "\n{} created, {} already synchronized, {} skipped, {} invalid, {} failed",
        summary.created,
        summary.already_synchronized,
        summary.skipped,
        summary.invalid,
        summary.failed
    );
    Ok(())
}

pub async fn list_command(mut config: SyncConfig, args: ListArgs) -> Result<()> {
    args.overrides.apply(&mut config);

    let fetcher = RegisterFetcher::new(&config.source_url, config.timeout())?;
    let records = fetcher
        .fetch(&config.phase)
        .await
        .with_context(|| format!("Could not read the register index at {}", fetcher.url()))?;

    let transformer = transformer(&config);
    let mut drafts = Vec::new();
    for record in records {
        match transformer.transform(&record) {
            Ok(draft) => drafts.push(draft),
            Err(e) => warn!("Skipping register '{}': {}", record.name, e),
        }
    }
    debug!("Built {} drafts", drafts.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&drafts)?);
        return Ok(());
    }

    if drafts.is_empty() {
        println!("No registers in phase '{}'.", config.phase);
        return Ok(());
    }

    let rows: Vec<DraftRow> = drafts
        .into_iter()
        .map(|d| DraftRow {
            name: d.name,
            title: d.title,
            owner_org: d.owner_org,
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub fn config_command(config: &SyncConfig) -> Result<()> {
    let mut effective = config.clone();
    effective.organisations = config.organisation_map();
    let yaml = serde_yaml_ng::to_string(&effective).context("Failed to serialize config")?;
    print!("{yaml}");
    Ok(())
}
