//! Waymark CLI
//!
//! Command-line interface for exercising the geocoding and routing engines.

#![allow(clippy::print_stdout)]

mod settings;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use domain::{BoundingBox, Coordinate};
use integration_geo::{
    GeoConfig, GeocodingClient, NominatimGeocodingClient, OsrmRoutingClient, RouteRequest,
    RoutingClient, SearchOptions, geojson,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waymark CLI
#[derive(Debug, Parser)]
#[command(name = "waymark-cli")]
#[command(author, version, about = "Waymark geocoding and routing CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./waymark.toml when present)
    #[arg(short, long, env = "WAYMARK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search places by free-form query
    ///
    /// Example: waymark-cli search "Rynek Główny" --bbox 19.79,49.97,20.22,50.13
    Search {
        /// Place name or address
        query: String,

        /// Restrict results to minLon,minLat,maxLon,maxLat
        #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
        bbox: Option<BoundingBox>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Look up the address at a position
    Reverse {
        /// Latitude in degrees
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Calculate a route through two or more points
    ///
    /// Example: waymark-cli route 19.9397,50.0625 19.9355,50.054 --output route.geojson
    Route {
        /// Points as lon,lat in visiting order
        #[arg(required = true, value_parser = parse_point, allow_hyphen_values = true)]
        points: Vec<Coordinate>,

        /// Travel profile (configured default when omitted)
        #[arg(short, long)]
        profile: Option<String>,

        /// Routing engine port (configured default when omitted)
        #[arg(long)]
        port: Option<u16>,

        /// Write the route as GeoJSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Read waypoints from a GeoJSON file and list them
    ImportWaypoints {
        /// GeoJSON FeatureCollection
        file: PathBuf,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn parse_numbers<const N: usize>(input: &str, what: &str) -> Result<[f64; N], String> {
    let values = input
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid {what} {input:?}: {e}"))?;
    <[f64; N]>::try_from(values)
        .map_err(|v| format!("{what} needs {N} comma-separated numbers, got {}", v.len()))
}

/// Parse `lon,lat`
fn parse_point(input: &str) -> Result<Coordinate, String> {
    let [lon, lat] = parse_numbers(input, "point")?;
    Coordinate::new(lon, lat).map_err(|e| e.to_string())
}

/// Parse `minLon,minLat,maxLon,maxLat`
fn parse_bbox(input: &str) -> Result<BoundingBox, String> {
    let [min_lon, min_lat, max_lon, max_lat] = parse_numbers(input, "bounding box")?;
    Ok(BoundingBox::new(min_lon, min_lat, max_lon, max_lat))
}

async fn search(
    config: &GeoConfig,
    query: &str,
    bbox: Option<BoundingBox>,
    limit: Option<u32>,
) -> anyhow::Result<()> {
    let client = NominatimGeocodingClient::new(&config.geocoding)?;

    let mut options = SearchOptions::default();
    if let Some(bbox) = bbox {
        options = options.with_bounding_box(bbox);
    }
    if let Some(limit) = limit {
        options = options.with_limit(limit);
    }

    let results = client.search_address(query, &options).await?;
    if results.is_empty() {
        println!("🔍 No places found for \"{query}\"");
        return Ok(());
    }

    println!("🔍 {} result(s) for \"{query}\":", results.len());
    for (i, place) in results.iter().enumerate() {
        println!(
            "{:>3}. {} [{}]\n     📍 {:.6}, {:.6}  importance {:.2}",
            i + 1,
            place.display_name,
            place.place_type,
            place.lat,
            place.lon,
            place.importance
        );
    }
    Ok(())
}

async fn reverse(config: &GeoConfig, lat: f64, lon: f64) -> anyhow::Result<()> {
    let client = NominatimGeocodingClient::new(&config.geocoding)?;

    match client.get_address_from_coordinates(lat, lon).await? {
        Some(address) => {
            println!("🏠 {}", address.formatted_address);
            println!("   {}", address.display_name);
            if let Some(city) = &address.city {
                println!("   City: {city}");
            }
        },
        None => println!("🏠 No address found at {lat}, {lon}"),
    }
    Ok(())
}

async fn route(
    config: &GeoConfig,
    request: &RouteRequest,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let client = OsrmRoutingClient::new(&config.routing)?;
    let route = client.calculate_route(request).await?;

    println!("🧭 Route: {}", route.format_summary());
    for instruction in &route.instructions {
        println!(
            "   {:<20} {:>10}  {}",
            instruction.icon.as_str(),
            instruction.distance_text,
            instruction.text
        );
    }

    if let Some(output) = output {
        let document = geojson::export_route(&route)?;
        tokio::fs::write(output, document)
            .await
            .with_context(|| format!("writing {}", output.display()))?;
        info!(path = %output.display(), "Route written");
        println!("💾 Saved to {}", output.display());
    }
    Ok(())
}

async fn import_waypoints(file: &Path) -> anyhow::Result<()> {
    let input = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let waypoints = geojson::import_waypoints(&input)?;

    println!("📌 {} waypoint(s) in {}:", waypoints.len(), file.display());
    for waypoint in &waypoints {
        let stop = waypoint
            .stop_duration
            .map(|m| format!("  ⏱️ {m} min"))
            .unwrap_or_default();
        println!(
            "{:>3}. {} ({}){stop}",
            waypoint.order + 1,
            waypoint.name,
            waypoint.coordinate
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = settings::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Search { query, bbox, limit } => search(&config, &query, bbox, limit).await?,
        Commands::Reverse { lat, lon } => reverse(&config, lat, lon).await?,
        Commands::Route {
            points,
            profile,
            port,
            output,
        } => {
            let mut request = RouteRequest::new(points);
            if let Some(profile) = profile {
                request = request.with_profile(profile);
            }
            if let Some(port) = port {
                request = request.with_port(port);
            }
            route(&config, &request, output.as_deref()).await?;
        },
        Commands::ImportWaypoints { file } => import_waypoints(&file).await?,
    }

    Ok(())
}
