//! Stock Radar CLI
//!
//! Watch Taiwan-listed stocks and rank them by short, medium and long
//! horizon technical ratings.
//!
//! # Usage
//!
//! ```bash
//! # One-shot ranking of a few stocks
//! cargo run -p radar-cli -- --watch 台積電 2454 環球晶 --once
//!
//! # Interactive session, long horizon only
//! RADAR_LOG_FORMAT=json cargo run -p radar-cli -- --horizon long
//! ```

mod commands;
mod render;

use anyhow::Context;
use clap::Parser;
use radar_core::{
    CachedHistoryProvider, Horizon, PriceHistoryProvider, RadarConfig, RadarError,
    RatingFilter, RefreshReport, SymbolDictionary, TickerResolver, WatchlistMonitor,
    YahooFinanceClient, YahooQuotePage, YahooSearchClient,
};
use radar_utils::Settings;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use commands::Command;

#[derive(Parser, Debug)]
#[command(name = "stock-radar")]
#[command(about = "Multi-horizon technical ratings for a stock watchlist", long_about = None)]
struct Args {
    /// Queries to add before the first refresh (codes, names or partial names)
    #[arg(short, long, num_args = 1..)]
    watch: Vec<String>,

    /// Refresh once, print the rankings and exit
    #[arg(long)]
    once: bool,

    /// Show only one horizon (short, medium, long)
    #[arg(long)]
    horizon: Option<Horizon>,

    /// Show strong-buy class ratings only
    #[arg(long)]
    strong_only: bool,

    /// Accept US listings from the remote search
    #[arg(long)]
    foreign: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

/// Interactive state around the monitor
struct Session {
    monitor: WatchlistMonitor,
    horizon: Option<Horizon>,
    filter: RatingFilter,
}

impl Session {
    fn horizons(&self) -> Vec<Horizon> {
        self.horizon.map_or_else(|| Horizon::ALL.to_vec(), |h| vec![h])
    }

    async fn add(&mut self, query: &str) {
        match self.monitor.add(query).await {
            Ok(outcome) if outcome.is_duplicate() => {
                println!("Already watching {}", outcome.identifier());
            }
            Ok(outcome) => println!("Added {}", outcome.identifier()),
            Err(RadarError::NotFound(q)) => println!("Not found: {q}"),
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    async fn refresh(&mut self) {
        if self.monitor.watchlist().is_empty() {
            println!("Watchlist is empty. Type a stock code or name to add one.");
            return;
        }

        let report = self.monitor.refresh().await;
        self.print_report(&report);
    }

    fn print_report(&self, report: &RefreshReport) {
        for note in render::refresh_notes(report) {
            println!("{note}");
        }
        for horizon in self.horizons() {
            let entries = report.filtered(horizon, self.filter);
            if entries.is_empty() {
                println!("{horizon}: no matching entries");
                continue;
            }
            let table =
                render::ranking_table(horizon, &entries, report, self.monitor.newly_added());
            println!("{table}\n");
        }
    }

    /// Returns false when the session should end
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Add { query } => {
                self.add(&query).await;
                self.refresh().await;
            }
            Command::Remove { query } => match self.monitor.remove(&query) {
                Ok(id) => println!("Removed {id}"),
                Err(e) => println!("{e}"),
            },
            Command::List => {
                let watchlist = self.monitor.watchlist();
                if watchlist.is_empty() {
                    println!("Watchlist is empty.");
                } else {
                    println!(
                        "{}",
                        render::watchlist_table(&watchlist, self.monitor.newly_added())
                    );
                }
            }
            Command::Refresh => self.refresh().await,
            Command::Horizon { horizon } => {
                self.horizon = horizon;
                match horizon {
                    Some(h) => println!("Showing {h} horizon"),
                    None => println!("Showing all horizons"),
                }
            }
            Command::Strong => {
                self.filter = match self.filter {
                    RatingFilter::All => RatingFilter::StrongOnly,
                    RatingFilter::StrongOnly => RatingFilter::All,
                };
                println!("Filter: {:?}", self.filter);
            }
            Command::Help => println!("{}", Command::help_text()),
            Command::Exit => return false,
        }
        true
    }
}

fn build_monitor(config: RadarConfig) -> anyhow::Result<WatchlistMonitor> {
    let yahoo = Arc::new(
        YahooFinanceClient::new(config.request_timeout).context("creating Yahoo client")?,
    );
    let history: Arc<dyn PriceHistoryProvider> =
        Arc::new(CachedHistoryProvider::new(yahoo, config.history_cache_ttl));
    let search = Arc::new(YahooSearchClient::new(
        config.request_timeout,
        config.search_rate_limit,
        config.search_limit,
    )?);
    let pages = Arc::new(YahooQuotePage::new(config.request_timeout)?);

    let resolver = TickerResolver::standard(
        SymbolDictionary::builtin(),
        search,
        Arc::clone(&history),
        pages,
        &config,
    );
    info!("Resolver chain: {}", resolver.strategy_names().join(" -> "));

    Ok(WatchlistMonitor::new(resolver, history, config))
}

fn print_banner() {
    println!(
        r"
╔══════════════════════════════════════════════════════════════╗
║                     Stock Radar 股票雷達                     ║
║                                                              ║
║  Type a code or name to watch it:  2330 / 台積電 / 聯發      ║
║    /refresh          - 更新評等 (Refresh ratings)            ║
║    /horizon <s|m|l>  - 切換週期 (Select horizon)             ║
║    /help             - 顯示說明 (Help)                       ║
║    /exit             - 離開 (Exit)                           ║
╚══════════════════════════════════════════════════════════════╝
"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    radar_utils::init_tracing(&settings);

    let args = Args::parse();

    let mut builder = RadarConfig::builder().with_env();
    if args.foreign {
        builder = builder.accept_foreign(true);
    }
    if let Some(secs) = args.timeout_secs {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }
    let config = builder.build()?;

    info!("Starting {} ({})", settings.app_name, settings.environment);

    let mut session = Session {
        monitor: build_monitor(config)?,
        horizon: args.horizon,
        filter: if args.strong_only {
            RatingFilter::StrongOnly
        } else {
            RatingFilter::All
        },
    };

    for query in &args.watch {
        session.add(query).await;
    }

    if args.once {
        session.refresh().await;
        return Ok(());
    }

    print_banner();
    if !args.watch.is_empty() {
        session.refresh().await;
    }

    // Run REPL
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("radar> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Error reading input: {}", e);
                continue;
            }
        }

        if input.trim().is_empty() {
            continue;
        }

        match Command::parse(&input) {
            Ok(command) => {
                debug!("Command: {}", command.description());
                if !session.handle(command).await {
                    break;
                }
            }
            Err(e) => eprintln!("{e}\nType /help for commands."),
        }
    }

    println!("Goodbye!");
    Ok(())
}
