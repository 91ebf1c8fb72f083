use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use squeezescan::application::agents::{
    MarketScanner, ScanCancellation, ScanScheduler, ScanSettings, UniverseSelector,
};
use squeezescan::config::{Config, LogFormat, Mode};
use squeezescan::domain::market::Resolution;
use squeezescan::domain::ports::MarketDataService;
use squeezescan::domain::scan::{RetainMode, ScanProgress};
use squeezescan::infrastructure::observability::{CycleReporter, ScanMetrics};
use squeezescan::infrastructure::{
    CachedMarketDataService, DeltaMarketDataService, MockMarketDataService,
};
use squeezescan::interfaces::table::{render_report, render_universe};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about = "Volatility squeeze scanner for Delta Exchange perpetuals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use the offline demo venue instead of Delta Exchange
    #[arg(long, global = true)]
    mock: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan cycle and print the table
    Scan(ScanArgs),
    /// Re-run scans on an interval until Ctrl-C
    Watch {
        #[command(flatten)]
        scan: ScanArgs,

        /// Seconds between the end of one cycle and the start of the next
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Print the selected universe with 24h volumes
    Universe {
        #[arg(short, long)]
        top_n: Option<usize>,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Candle resolution: 15m, 1h or 4h
    #[arg(short, long)]
    resolution: Option<String>,

    /// Number of instruments to scan (1-50)
    #[arg(short, long)]
    top_n: Option<usize>,

    /// Keep neutral instruments in the results
    #[arg(long)]
    all: bool,
}

impl ScanArgs {
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(resolution) = &self.resolution {
            config.scanner.resolution = Resolution::from_str(resolution)?;
        }
        if let Some(top_n) = self.top_n {
            config.scanner.top_n = top_n;
        }
        if self.all {
            config.scanner.retain_mode = RetainMode::All;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    init_logging(config.observability.log_format);

    if cli.mock {
        config.mode = Mode::Mock;
    }

    match cli.command {
        Commands::Scan(args) => {
            args.apply(&mut config)?;
            run_scan(&config).await
        }
        Commands::Watch {
            scan,
            interval_secs,
        } => {
            scan.apply(&mut config)?;
            if let Some(secs) = interval_secs {
                config.scanner.refresh_interval = Duration::from_secs(secs);
            }
            run_watch(&config).await
        }
        Commands::Universe { top_n } => {
            if let Some(top_n) = top_n {
                config.scanner.top_n = top_n;
            }
            run_universe(&config).await
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init(),
    }
}

fn build_market_service(config: &Config) -> Arc<dyn MarketDataService> {
    match config.mode {
        Mode::Mock => {
            info!("Using offline demo venue");
            Arc::new(MockMarketDataService::demo())
        }
        Mode::Delta => {
            let delta: Arc<dyn MarketDataService> = Arc::new(
                DeltaMarketDataService::builder()
                    .base_url(config.venue.base_url.clone())
                    .request_timeout(config.venue.request_timeout)
                    .build(),
            );
            if config.scanner.cache_ttl.is_zero() {
                delta
            } else {
                Arc::new(CachedMarketDataService::new(delta, config.scanner.cache_ttl))
            }
        }
    }
}

fn build_scanner(
    config: &Config,
    settings: ScanSettings,
    cancellation: ScanCancellation,
) -> Result<MarketScanner> {
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<ScanProgress>();
    tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            debug!(
                "Progress: {:?} {}/{} {}",
                progress.phase,
                progress.completed,
                progress.total,
                progress.current_symbol.as_deref().unwrap_or("-")
            );
        }
    });

    let mut scanner = MarketScanner::new(build_market_service(config), settings)
        .with_progress(progress_tx)
        .with_cancellation(cancellation);

    if config.observability.enabled {
        scanner = scanner.with_metrics(ScanMetrics::new()?);
    }
    Ok(scanner)
}

fn cancel_on_ctrl_c(cancellation: ScanCancellation) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Ctrl-C received, stopping after the current instrument");
                cancellation.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}

async fn run_scan(config: &Config) -> Result<()> {
    let settings = config.to_scan_settings()?;
    let cancellation = ScanCancellation::new();
    cancel_on_ctrl_c(cancellation.clone());

    let scanner = build_scanner(config, settings, cancellation)?;
    let report = scanner.run_cycle().await;

    println!("{}", render_report(&report));
    if config.observability.enabled {
        CycleReporter::new().report(&report);
    }
    Ok(())
}

async fn run_watch(config: &Config) -> Result<()> {
    let settings = config.to_scan_settings()?;
    let cancellation = ScanCancellation::new();
    cancel_on_ctrl_c(cancellation.clone());

    let scanner = Arc::new(build_scanner(config, settings, cancellation)?);
    let (report_tx, mut report_rx) = mpsc::channel(4);
    let scheduler = ScanScheduler::new(scanner, report_tx, config.scanner.refresh_interval);
    let handle = tokio::spawn(async move { scheduler.run().await });

    let reporter = CycleReporter::new();
    while let Some(report) = report_rx.recv().await {
        println!("{}", render_report(&report));
        if config.observability.enabled {
            reporter.report(&report);
        }
    }

    handle.await.context("Scheduler task failed")?;
    Ok(())
}

async fn run_universe(config: &Config) -> Result<()> {
    let settings = config.to_scan_settings()?;
    let service = build_market_service(config);
    let selector = UniverseSelector::new(settings.settlement_asset.clone());

    let members = selector
        .load(service.as_ref(), settings.top_n)
        .await
        .context("Failed to load universe")?;

    println!("{}", render_universe(&members));
    Ok(())
}
