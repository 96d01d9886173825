use std::error::Error;
use std::process::ExitCode;

use chrono::{Days, Local, NaiveDate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tour_planner::catalog::{
    Catalog, DestinationFilter, InMemoryCatalog, InMemoryItineraryStore, ItineraryStore,
};
use tour_planner::domain::{DateRange, Money, PreferenceSet, TravelerId, TravelerProfile};
use tour_planner::graph::{RouteGraph, SimilarityGraph};
use tour_planner::index::{SortCriterion, sort_destinations};
use tour_planner::planner::{GenerateRequest, GeneratorConfig, ItineraryGenerator, Strategy};
use tour_planner::random::RngSource;

/// How many similar destinations to list.
const RECOMMENDATIONS: usize = 3;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Read an optional setting, warning and falling back when it doesn't parse.
fn setting<T>(name: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        warn!(setting = name, value = %raw, "ignoring unparseable setting");
    }
    parsed
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn run() -> Result<(), Box<dyn Error>> {
    let catalog = match std::env::var("TOUR_CATALOG") {
        Ok(path) => {
            info!(%path, "loading catalog");
            InMemoryCatalog::load_json(&path)?
        }
        Err(_) => InMemoryCatalog::lima()?,
    };

    let preferences = std::env::var("TOUR_PREFERENCES")
        .map(|p| PreferenceSet::parse(&p))
        .unwrap_or_default();
    let mut profile = TravelerProfile::new(TravelerId(1)).with_preferences(preferences);
    profile.budget = setting("TOUR_BUDGET", |s| Money::parse(s).ok());

    let start = setting("TOUR_START", parse_date).unwrap_or_else(|| Local::now().date_naive());
    let end = setting("TOUR_END", parse_date)
        .or_else(|| start.checked_add_days(Days::new(2)))
        .unwrap_or(start);
    let dates = DateRange::new(start, end)?;

    let strategy = setting("TOUR_STRATEGY", |s| s.parse::<Strategy>().ok()).unwrap_or_default();
    let seed =
        setting("TOUR_SEED", |s| s.trim().parse::<u64>().ok()).unwrap_or_else(rand::random);
    info!(seed, %strategy, days = dates.day_count(), "planning itinerary");

    let config = GeneratorConfig::default();
    let request = GenerateRequest::new(profile, dates).with_strategy(strategy);
    let itinerary = ItineraryGenerator::new(&catalog, &config)
        .generate(&request, &mut RngSource::seeded(seed))?;

    let mut store = InMemoryItineraryStore::new();
    let itinerary = store.create(itinerary)?;
    let totals = itinerary.totals();
    info!(
        items = itinerary.len(),
        cost = %totals.cost,
        minutes = totals.minutes,
        distance_km = totals.distance_km,
        "{}",
        itinerary.description
    );
    println!("{}", serde_json::to_string_pretty(&itinerary)?);

    let similar = SimilarityGraph::from_catalog(&catalog)?;
    let routes = RouteGraph::from_routes(&catalog.active_routes()?);
    for item in itinerary.items() {
        for rec in similar.recommend(item.destination, RECOMMENDATIONS) {
            info!(
                from = %item.destination,
                to = %rec.destination,
                percent = rec.percent,
                "similar destination"
            );
        }
    }
    if let (Some(first), Some(last)) = (itinerary.items().first(), itinerary.last_item()) {
        let path = routes.shortest_path(first.destination.into(), last.destination.into());
        match routes.summarize(path.path()) {
            Some(summary) if path.is_found() => info!(
                legs = summary.legs,
                distance_km = summary.distance_km,
                minutes = summary.time_mins,
                cost = %summary.cost,
                "route from first to last stop"
            ),
            _ => info!(from = %first.destination, to = %last.destination, "no stored route"),
        }
    }

    let criterion = setting("TOUR_SORT", |s| s.parse::<SortCriterion>().ok()).unwrap_or_default();
    let destinations = catalog.active_destinations(&DestinationFilter::any())?;
    let (sorted, _) = sort_destinations(destinations, criterion, criterion != SortCriterion::Name);
    for (rank, destination) in sorted.iter().enumerate() {
        info!(rank = rank + 1, %criterion, "{}", destination.name);
    }

    Ok(())
}
