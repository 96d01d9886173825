//! End-to-end scenarios over the bundled Lima catalog.

use chrono::NaiveDate;

use crate::catalog::{
    Catalog, DestinationFilter, InMemoryCatalog, InMemoryItineraryStore, ItineraryStore,
};
use crate::domain::{
    DateRange, DestinationId, GeoPoint, ItineraryStatus, Money, PreferenceSet, TravelerId,
    TravelerProfile,
};
use crate::graph::{Node, PathResult, RouteGraph, SimilarityGraph};
use crate::index::{SortCriterion, sort_destinations};
use crate::planner::{
    EditError, GenerateRequest, GeneratorConfig, ItineraryEditor, ItineraryGenerator, Strategy,
};
use crate::random::RngSource;

fn lima() -> InMemoryCatalog {
    InMemoryCatalog::lima().unwrap()
}

fn dates(days: u32) -> DateRange {
    let start = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 8, days).unwrap();
    DateRange::new(start, end).unwrap()
}

fn profile(preferences: &str, budget: Option<u64>) -> TravelerProfile {
    let mut profile =
        TravelerProfile::new(TravelerId(1)).with_preferences(PreferenceSet::parse(preferences));
    profile.budget = budget.map(Money::from_units);
    profile
}

fn node(id: u32) -> Node {
    Node::Destination(DestinationId(id))
}

#[test]
fn bundled_catalog_loads() {
    let catalog = lima();
    let active = catalog.active_destinations(&DestinationFilter::any()).unwrap();
    assert_eq!(active.len(), 9);
    assert!(active.iter().all(|d| d.name != "Playa Agua Dulce"));
    assert_eq!(catalog.active_routes().unwrap().len(), 9);
    // The ceramics workshop is listed but not running.
    assert_eq!(catalog.activities(DestinationId(2), true).unwrap().len(), 1);
    assert_eq!(catalog.activities(DestinationId(2), false).unwrap().len(), 2);
}

#[test]
fn generate_and_store_within_budget() {
    let catalog = lima();
    let config = GeneratorConfig::default();
    let generator = ItineraryGenerator::new(&catalog, &config);
    let mut store = InMemoryItineraryStore::new();

    for seed in 0..20 {
        let request = GenerateRequest::new(profile("museos,cultura", Some(100)), dates(2));
        let itinerary = generator
            .generate(&request, &mut RngSource::seeded(seed))
            .unwrap();

        assert!(!itinerary.is_empty());
        assert!(itinerary.len() <= 3);
        assert!(itinerary.totals().cost <= Money::from_units(100));
        assert_eq!(itinerary.status, ItineraryStatus::Draft);

        let stored = store.create(itinerary).unwrap();
        let id = stored.id.unwrap();
        assert_eq!(store.get(id).unwrap().as_ref(), Some(&stored));
    }
    assert_eq!(store.len(), 20);
}

#[test]
fn optimized_spreads_over_days() {
    let catalog = lima();
    let config = GeneratorConfig::default();
    let request = GenerateRequest::new(profile("playa,gastronomia", Some(200)), dates(3))
        .with_strategy(Strategy::Optimized);

    let itinerary = ItineraryGenerator::new(&catalog, &config)
        .generate(&request, &mut RngSource::seeded(3))
        .unwrap();

    assert!(!itinerary.is_empty());
    assert!(itinerary.items().iter().all(|i| (1..=3).contains(&i.day)));
    assert!(itinerary.totals().cost <= Money::from_units(200));
    // Three picks over three days: one per day.
    if itinerary.len() == 3 {
        let days: Vec<u32> = itinerary.items().iter().map(|i| i.day).collect();
        assert_eq!(days, [1, 2, 3]);
    }
}

#[test]
fn zero_budget_keeps_only_free_visits() {
    let catalog = lima();
    let config = GeneratorConfig::default();
    let request = GenerateRequest::new(profile("", Some(0)), dates(1));

    let itinerary = ItineraryGenerator::new(&catalog, &config)
        .generate(&request, &mut RngSource::seeded(0))
        .unwrap();

    // Parque Kennedy's walking tour is the only free activity.
    assert_eq!(itinerary.len(), 1);
    assert_eq!(itinerary.items()[0].destination, DestinationId(4));
    assert_eq!(itinerary.totals().cost, Money::ZERO);
}

#[test]
fn unaffordable_request_gives_explained_empty_itinerary() {
    let catalog = lima();
    let config = GeneratorConfig::default();
    let filter = DestinationFilter::any().with_any_tag(PreferenceSet::parse("museos"));
    let request = GenerateRequest::new(profile("", Some(10)), dates(1)).with_filter(filter);

    let itinerary = ItineraryGenerator::new(&catalog, &config)
        .generate(&request, &mut RngSource::seeded(0))
        .unwrap();

    assert!(itinerary.is_empty());
    assert_eq!(itinerary.description, "No destination fits the budget of S/ 10.00.");
    assert_eq!(itinerary.totals().cost, Money::ZERO);
}

#[test]
fn edit_generated_itinerary() {
    let catalog = lima();
    let config = GeneratorConfig::default();
    let request = GenerateRequest::new(profile("", None), dates(2));
    let mut itinerary = ItineraryGenerator::new(&catalog, &config)
        .generate(&request, &mut RngSource::seeded(11))
        .unwrap();
    let before = itinerary.len();

    let editor = ItineraryEditor::new(&catalog, &config);
    let order = editor
        .append(&mut itinerary, DestinationId(4), None, None)
        .unwrap();
    assert_eq!(itinerary.len(), before + 1);
    assert_eq!(itinerary.last_item().map(|i| i.order), Some(order));

    // Inactive destinations cannot be appended.
    let err = editor.append(&mut itinerary, DestinationId(10), None, None);
    assert!(matches!(err, Err(EditError::UnknownDestination(_))));
    assert_eq!(itinerary.len(), before + 1);

    editor.remove_item(&mut itinerary, 1).unwrap();
    let orders: Vec<u32> = itinerary.items().iter().map(|i| i.order).collect();
    assert_eq!(orders, (1..=before as u32).collect::<Vec<_>>());
}

#[test]
fn museums_recommend_museums() {
    let graph = SimilarityGraph::from_catalog(&lima()).unwrap();
    assert_eq!(graph.node_count(), 9);

    let recs = graph.recommend(DestinationId(2), 2);
    let mut ids: Vec<u32> = recs.iter().map(|r| r.destination.0).collect();
    ids.sort_unstable();
    // The two other museums tie at 0.8.
    assert_eq!(ids, [7, 9]);
    assert!(recs.iter().all(|r| (r.weight - 0.8).abs() < 1e-9));

    assert!(graph.recommend(DestinationId(10), 3).is_empty());
}

#[test]
fn stored_routes_shortest_path() {
    let routes = lima().active_routes().unwrap();
    let graph = RouteGraph::from_routes(&routes);

    let result = graph.shortest_path(node(1), node(2));
    assert_eq!(result.path(), [node(1), node(4), node(3), node(9), node(2)]);
    let km = result.distance_km().unwrap();
    assert!((km - 11.4).abs() < 1e-9, "got {km}");

    let summary = graph.summarize(result.path()).unwrap();
    assert_eq!(summary.legs, 4);
    assert_eq!(summary.time_mins, 76);
    assert_eq!(summary.cost, Money::from_units(26));

    // Nothing leads back to the beach.
    assert_eq!(graph.shortest_path(node(2), node(1)), PathResult::Unreachable);
}

#[test]
fn geographic_path_from_hotel() {
    let destinations = lima()
        .active_destinations(&DestinationFilter::any())
        .unwrap();
    let graph = RouteGraph::geographic(&destinations);

    // Straight lines satisfy the triangle inequality, so the direct hop wins.
    let hotel = GeoPoint::new(-12.1200, -77.0300);
    let result = graph.shortest_path_from_point(hotel, DestinationId(2));
    assert_eq!(result.path(), [Node::Origin, node(2)]);
}

#[test]
fn listing_sorted_by_rating() {
    let destinations = lima()
        .active_destinations(&DestinationFilter::any())
        .unwrap();
    let (sorted, index) = sort_destinations(destinations, SortCriterion::Rating, true);

    assert_eq!(sorted[0].name, "Museo Larco");
    assert!(sorted.windows(2).all(|w| w[0].rating >= w[1].rating));
    assert_eq!(index.verify(), Ok(()));
}
