use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use metro_planner::domain::{StationId, TimeOfDay, format_instant};
use metro_planner::network::{Network, build_network};
use metro_planner::planner::{
    ConfigError, Direction, Itinerary, Planner, SearchConfig, SpanningResult, find_components,
    find_strong_components,
};
use metro_planner::source::FeedSnapshot;

/// How long loading the feed and building the network may take.
const BUILD_TIMEOUT: Duration = Duration::from_secs(60);

/// Plan journeys over one service day of a transit feed snapshot.
#[derive(Debug, Parser)]
#[command(name = "metro-planner", version)]
struct Args {
    /// JSON feed snapshot to load
    #[arg(long)]
    feed: PathBuf,

    /// Service date (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    /// Start of the loaded schedule window (HH:MM:SS, hours may exceed 23)
    #[arg(long, default_value = "00:00:00")]
    window_start: TimeOfDay,

    /// End of the loaded schedule window
    #[arg(long, default_value = "30:00:00")]
    window_end: TimeOfDay,

    /// Transfer time between stops of a station when the feed lists none
    #[arg(long, global = true, env = "METRO_DEFAULT_TRANSFER_SECS")]
    transfer_secs: Option<i64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Find an itinerary between two stations
    Itinerary {
        from: StationId,
        to: StationId,

        /// Leave no earlier than this, or with --backward arrive no later
        time: TimeOfDay,

        #[arg(long)]
        backward: bool,
    },

    /// Grow a minimum-time spanning tree from a station
    Spanning { start: StationId, time: TimeOfDay },

    /// List connected components of the station graph
    Components,

    /// List strongly connected components, following trips one way
    StrongComponents,
}

impl Args {
    fn search_config(&self) -> Result<SearchConfig, ConfigError> {
        match self.transfer_secs {
            Some(secs) => SearchConfig::with_default_transfer_secs(secs),
            None => Ok(SearchConfig::default()),
        }
    }
}

async fn load(args: &Args) -> Result<Network, String> {
    let snapshot = FeedSnapshot::from_path(&args.feed).map_err(|e| e.to_string())?;
    let build = build_network(&snapshot, args.date, args.window_start, args.window_end);

    tokio::time::timeout(BUILD_TIMEOUT, build)
        .await
        .map_err(|_| format!("building the network took longer than {BUILD_TIMEOUT:?}"))?
        .map_err(|e| e.to_string())
}

fn print_itinerary(itinerary: &Itinerary) {
    println!(
        "{} -> {} ({} min)",
        format_instant(itinerary.departure),
        format_instant(itinerary.arrival),
        itinerary.duration().num_minutes()
    );
    for visit in &itinerary.stops {
        println!(
            "  {}  {}  {:<8} {} ({})",
            visit.arrival.format("%H:%M:%S"),
            visit.departure.format("%H:%M:%S"),
            visit.station,
            visit.stop_name,
            visit.stop
        );
    }
}

fn print_spanning(result: &SpanningResult) {
    for edge in &result.edges {
        println!(
            "  {} -> {}  {}  {} -> {}  {}s",
            edge.from,
            edge.to,
            edge.trip,
            edge.departure.format("%H:%M:%S"),
            edge.arrival.format("%H:%M:%S"),
            edge.cost_secs
        );
    }
    println!(
        "spanned {} stations, total ride {}s, fully connected: {}",
        result.spanned_stations().len(),
        result.total_cost_secs,
        result.fully_connected
    );
    if !result.unreached.is_empty() {
        let unreached: Vec<&str> = result.unreached.iter().map(|s| s.as_str()).collect();
        println!("unreached: {}", unreached.join(", "));
    }
}

fn run(args: &Args, network: &Network, config: &SearchConfig) -> Result<(), String> {
    let planner = Planner::new(network, config);

    match &args.command {
        Command::Itinerary {
            from,
            to,
            time,
            backward,
        } => {
            let direction = if *backward {
                Direction::Backward
            } else {
                Direction::Forward
            };
            let itinerary = planner
                .find_itinerary(from, to, time.on(args.date), direction)
                .map_err(|e| e.to_string())?;
            if args.json {
                print_json(&itinerary)?;
            } else {
                print_itinerary(&itinerary);
            }
        }
        Command::Spanning { start, time } => {
            let result = planner
                .find_spanning_tree(start, time.on(args.date))
                .map_err(|e| e.to_string())?;
            if args.json {
                print_json(&result)?;
            } else {
                print_spanning(&result);
            }
        }
        Command::Components => print_components(&find_components(network), args.json)?,
        Command::StrongComponents => {
            print_components(&find_strong_components(network), args.json)?
        }
    }
    Ok(())
}

fn print_components(components: &[Vec<StationId>], json: bool) -> Result<(), String> {
    if json {
        return print_json(&components);
    }
    for (i, component) in components.iter().enumerate() {
        let names: Vec<&str> = component.iter().map(|s| s.as_str()).collect();
        println!("{}: {}", i + 1, names.join(", "));
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.search_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    let network = match load(&args).await {
        Ok(network) => network,
        Err(e) => {
            error!("Failed to build network: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        date = %network.date(),
        stations = network.station_count(),
        "Network ready"
    );

    match run(&args, &network, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
