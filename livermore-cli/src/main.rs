//! Livermore CLI: breakout scan, single-symbol check, universe listing.
//!
//! Commands:
//! - `scan`: evaluate the whole universe, print the table, notify Slack
//! - `check`: evaluate one symbol and print every intermediate value
//! - `universe`: count the instruments a scan would visit, per venue
//!
//! Settings come from the environment (and `.env`); flags override them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use livermore_core::data::{
    history_window, ingest, CircuitBreaker, CsvProvider, DataProvider, SyntheticProvider,
    YahooProvider,
};
use livermore_core::domain::{Instrument, Venue};
use livermore_core::signal::{BreakoutRule, SignalEvaluator};
use livermore_core::universe::{
    CommodityTable, ListingDirectory, LongNameLookup, LongNameSource, MetadataResolver, Universe,
    UniverseFile,
};
use livermore_runner::{
    logging, render_table, run_scan, sort_results, ConsoleProgress, NotificationSink,
    NotifyOutcome, ScanConfig, SlackNotifier, SortKey,
};

#[derive(Parser)]
#[command(
    name = "livermore",
    about = "Livermore breakout scanner for Taiwan equities and commodity futures"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the universe and report every strong breakout.
    Scan {
        /// Scan commodities plus a few large caps only.
        #[arg(long, default_value_t = false)]
        test_mode: bool,

        /// Breakout lookback in trading days.
        #[arg(long)]
        lookback: Option<usize>,

        /// Calendar months of history to request.
        #[arg(long)]
        months: Option<u32>,

        /// Equity listing CSV.
        #[arg(long)]
        listing: Option<PathBuf>,

        /// TOML universe file; replaces the listing and commodity table.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Table order: category, symbol, streak, none.
        #[arg(long)]
        sort_by: Option<SortKey>,

        #[command(flatten)]
        source: SourceArgs,

        /// Print the table but do not send it.
        #[arg(long, default_value_t = false)]
        no_notify: bool,
    },
    /// Evaluate one symbol and print a diagnostic breakdown.
    Check {
        /// Provider symbol, e.g. 2330.TW or GC=F.
        symbol: String,

        #[arg(long)]
        lookback: Option<usize>,

        #[arg(long)]
        months: Option<u32>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Count the instruments a scan would visit.
    Universe {
        #[arg(long, default_value_t = false)]
        test_mode: bool,

        #[arg(long)]
        listing: Option<PathBuf>,

        #[arg(long)]
        universe: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceKind {
    Yahoo,
    Csv,
    Synthetic,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Where bars come from.
    #[arg(long, value_enum, default_value_t = SourceKind::Yahoo)]
    source: SourceKind,

    /// Directory of `<SYMBOL>.csv` files for `--source csv`.
    #[arg(long, default_value = "data/bars")]
    csv_dir: PathBuf,
}

/// A data provider plus, when it has one, its long-name lookup.
struct Providers {
    data: Arc<dyn DataProvider>,
    names: Option<Arc<dyn LongNameLookup>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ScanConfig::from_env().context("reading configuration")?;
    logging::init(&config.log_level);

    match cli.command {
        Commands::Scan {
            test_mode,
            lookback,
            months,
            listing,
            universe,
            sort_by,
            source,
            no_notify,
        } => {
            config.test_mode |= test_mode;
            apply_overrides(&mut config, lookback, months, listing);
            if let Some(key) = sort_by {
                config.sort_by = key;
            }
            run_scan_cmd(&config, universe.as_deref(), &source, no_notify)
        }
        Commands::Check {
            symbol,
            lookback,
            months,
            source,
        } => {
            apply_overrides(&mut config, lookback, months, None);
            run_check(&config, &symbol, &source)
        }
        Commands::Universe {
            test_mode,
            listing,
            universe,
        } => {
            config.test_mode |= test_mode;
            apply_overrides(&mut config, None, None, listing);
            run_universe(&config, universe.as_deref())
        }
    }
}

fn apply_overrides(
    config: &mut ScanConfig,
    lookback: Option<usize>,
    months: Option<u32>,
    listing: Option<PathBuf>,
) {
    if let Some(days) = lookback {
        config.lookback_days = days.max(1);
    }
    if let Some(m) = months {
        config.history_months = m.max(1);
    }
    if let Some(path) = listing {
        config.listing_file = path;
    }
}

fn build_providers(args: &SourceArgs) -> Result<Providers> {
    Ok(match args.source {
        SourceKind::Yahoo => {
            let breaker = Arc::new(CircuitBreaker::default_provider());
            let yahoo = Arc::new(YahooProvider::new(breaker)?);
            Providers {
                data: yahoo.clone(),
                names: Some(yahoo),
            }
        }
        SourceKind::Csv => Providers {
            data: Arc::new(CsvProvider::new(&args.csv_dir)),
            names: None,
        },
        SourceKind::Synthetic => Providers {
            data: Arc::new(SyntheticProvider::default()),
            names: None,
        },
    })
}

/// Listing used only for names; a missing file is not fatal.
fn load_listing(config: &ScanConfig) -> Option<ListingDirectory> {
    match ListingDirectory::from_file(&config.listing_file) {
        Ok(listing) => Some(listing),
        Err(e) => {
            warn!(error = %e, "listing unavailable, names fall back to provider lookup");
            None
        }
    }
}

/// Universe plus the structured metadata sources that describe it.
fn build_universe(
    config: &ScanConfig,
    universe_file: Option<&Path>,
) -> Result<(Universe, CommodityTable, Option<ListingDirectory>)> {
    if let Some(path) = universe_file {
        let file = UniverseFile::from_file(path).context("loading universe file")?;
        let listing = load_listing(config);
        return Ok((Universe::from_file(&file), file.commodity_table(), listing));
    }

    let commodities = CommodityTable::default_futures();
    if config.test_mode {
        let listing = load_listing(config);
        return Ok((Universe::test_mode(&commodities), commodities, listing));
    }

    let listing = ListingDirectory::from_file(&config.listing_file)
        .context("loading equity listing")?;
    let universe = Universe::full(&commodities, &listing);
    Ok((universe, commodities, Some(listing)))
}

fn build_evaluator(
    config: &ScanConfig,
    commodities: CommodityTable,
    listing: Option<ListingDirectory>,
    names: Option<Arc<dyn LongNameLookup>>,
) -> SignalEvaluator {
    let mut resolver = MetadataResolver::new().with_source(commodities);
    if let Some(listing) = listing {
        resolver = resolver.with_source(listing);
    }
    if let Some(names) = names {
        resolver = resolver.with_source(LongNameSource::new(names));
    }
    SignalEvaluator::new(BreakoutRule::new(config.lookback_days), resolver)
}

fn run_scan_cmd(
    config: &ScanConfig,
    universe_file: Option<&Path>,
    source: &SourceArgs,
    no_notify: bool,
) -> Result<()> {
    let (universe, commodities, listing) = build_universe(config, universe_file)?;
    let providers = build_providers(source)?;
    let evaluator = build_evaluator(config, commodities, listing, providers.names.clone());

    let today = chrono::Local::now().date_naive();
    let (start, end) = history_window(today, config.history_months);

    println!("\n=== Strong Breakout Scan ===");
    let mut progress = ConsoleProgress;
    let mut report = run_scan(
        &evaluator,
        providers.data.as_ref(),
        &universe,
        start,
        end,
        &mut progress,
    );
    let summary = report.summary;
    println!(
        "Scan complete: {} matched, {} no match, {} short history, {} failed",
        summary.matched, summary.no_match, summary.insufficient, summary.failed
    );
    if summary.skipped > 0 {
        println!(
            "Provider blocked; {} symbols were not requested.",
            summary.skipped
        );
    }

    if report.results.is_empty() {
        println!("No matches today.");
        return Ok(());
    }

    sort_results(&mut report.results, config.sort_by);
    let table = render_table(&report.results, config.lookback_days);
    println!("{table}");

    if no_notify {
        return Ok(());
    }
    let notifier = SlackNotifier::new(config.slack_webhook_url.clone())?;
    match notifier.notify(&table, report.results.len(), config.lookback_days) {
        Ok(NotifyOutcome::Sent) => println!("Slack notification sent."),
        Ok(NotifyOutcome::Skipped) => println!("SLACK_WEBHOOK_URL not set, skipping notification."),
        Err(e) => {
            warn!(error = %e, "slack notification failed");
            println!("Slack notification failed: {e}");
        }
    }
    Ok(())
}

fn run_check(config: &ScanConfig, symbol: &str, source: &SourceArgs) -> Result<()> {
    let instrument = Instrument::from_symbol(symbol);
    let providers = build_providers(source)?;
    let listing = load_listing(config);
    let evaluator = build_evaluator(
        config,
        CommodityTable::default_futures(),
        listing,
        providers.names.clone(),
    );

    let today = chrono::Local::now().date_naive();
    let (start, end) = history_window(today, config.history_months);
    let series = providers
        .data
        .fetch(symbol, start, end)
        .and_then(ingest)
        .with_context(|| format!("fetching {symbol}"))?;

    println!("Symbol:      {symbol} ({})", instrument.venue);
    println!("Provider:    {}", providers.data.name());
    println!("Bars:        {}", series.len());
    println!("Fingerprint: {}", series.fingerprint().short());

    let rule = evaluator.rule();
    let Some(inspection) = rule.inspect(&series) else {
        println!(
            "Not enough history: {} bars, need {}.",
            series.len(),
            rule.min_bars()
        );
        return Ok(());
    };

    println!("Close:       {:.2}", inspection.close);
    println!("Low:         {:.2}", inspection.low);
    println!("{}D high:    {:.2}", rule.lookback_days(), inspection.prior_high);
    for (period, value) in &inspection.averages {
        println!("SMA{period:<3}      {value:.2}");
    }
    println!("Up streak:   {}", inspection.up_streak);
    println!("Breakout:        {}", mark(inspection.is_breakout));
    println!("Above averages:  {}", mark(inspection.is_above_averages));
    println!("Up streak >= {}:  {}", rule.min_up_streak(), mark(inspection.has_up_streak));

    match evaluator.evaluate(&instrument, &series) {
        Some(result) => {
            println!();
            println!("{}", render_table(&[result], rule.lookback_days()));
        }
        None => println!("\nNo signal."),
    }
    Ok(())
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "pass"
    } else {
        "fail"
    }
}

fn run_universe(config: &ScanConfig, universe_file: Option<&Path>) -> Result<()> {
    let (universe, _, _) = build_universe(config, universe_file)?;
    for venue in [Venue::Commodity, Venue::Listed, Venue::OverTheCounter] {
        println!("{:<16} {}", venue.to_string(), universe.count_by_venue(venue));
    }
    println!("{:<16} {}", "total", universe.len());
    Ok(())
}
