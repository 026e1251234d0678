use anyhow::Context;
use clap::{Parser, ValueEnum};
use marketdash_core::domain::{AssetSelection, Timeframe};
use marketdash_core::generate::SyntheticMarket;
use marketdash_core::render::{Filter, MemorySurface};
use marketdash_core::Dashboard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// The generated market snapshot.
    Snapshot,
    /// Rendered regions and Chart.js configs.
    View,
}

#[derive(Debug, Parser)]
#[command(name = "marketdash_worker")]
struct Args {
    /// Asset filter: `all` or one symbol (e.g. Gold, SP500).
    #[arg(long, default_value = "all")]
    asset: AssetSelection,

    /// Timeframe selector (1d, 1w, 1m, 3m, 1y).
    #[arg(long, default_value = "1m")]
    timeframe: Timeframe,

    /// Seed for reproducible output. Falls back to MARKET_SEED.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Output::View)]
    output: Output,

    /// Pretty-print JSON.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = marketdash_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let json = run(&args, args.seed.or(settings.market_seed)).await?;
    println!("{json}");
    Ok(())
}

async fn run(args: &Args, seed: Option<u64>) -> anyhow::Result<String> {
    let filter = Filter {
        asset: args.asset,
        timeframe: args.timeframe,
    };
    let mut dashboard =
        Dashboard::new(SyntheticMarket::from_seed(seed), MemorySurface::new()).with_filter(filter);

    let snapshot = match dashboard.load_data().await {
        Ok(snapshot) => snapshot,
        Err(failure) => {
            sentry_anyhow::capture_anyhow(&failure.cause);
            return Err(anyhow::Error::new(failure));
        }
    };

    tracing::info!(
        snapshot_id = %snapshot.id,
        asset = %filter.asset,
        timeframe = %filter.timeframe,
        seed = ?seed,
        "worker cycle complete"
    );

    let value = match args.output {
        Output::Snapshot => serde_json::to_value(snapshot.as_ref()),
        Output::View => serde_json::to_value(dashboard.surface().view()),
    }
    .context("failed to serialize output")?;

    let text = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(text)
}

fn init_sentry(settings: &marketdash_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
