//! Integration tests for the routecast planning flow

use std::sync::Arc;

use chrono::NaiveDate;
use routecast::{
    Adjustment, CityCatalog, CitySearch, CityId, DateRange, FjallRouteGateway, RouteStore,
    RoutecastError, TripSession,
};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn range(a: u32, d: u32) -> DateRange {
    DateRange::new(date(a), date(d)).unwrap()
}

fn catalog() -> CityCatalog {
    use routecast::{City, Coordinates};
    CityCatalog::new(vec![
        City::new(CityId(1), "Paris").with_coordinates(Coordinates::new(48.8566, 2.3522)),
        City::new(CityId(2), "Lyon").with_coordinates(Coordinates::new(45.7640, 4.8357)),
        City::new(CityId(3), "Marseille").with_coordinates(Coordinates::new(43.2965, 5.3698)),
    ])
}

/// Pick cities from search, plan a trip, save it and edit it again
#[tokio::test]
async fn test_plan_save_and_reload_trip() {
    let catalog = catalog();
    let mut session = TripSession::new(RouteStore::in_memory());

    let paris = catalog.search("par").await.unwrap().remove(0);
    let lyon = catalog.search("LYON").await.unwrap().remove(0);
    let marseille = catalog.search("seille").await.unwrap().remove(0);

    assert_eq!(session.add_city(paris, range(1, 5)), Adjustment::Unchanged);
    let adjustment = session.add_city(lyon, range(3, 7));
    assert_eq!(
        adjustment,
        Adjustment::ArrivalClamped {
            requested: range(3, 7),
            applied: range(5, 7),
        }
    );
    let adjustment = session.add_city(marseille, range(2, 4));
    assert_eq!(
        adjustment,
        Adjustment::StayClamped {
            requested: range(2, 4),
            applied: range(7, 7),
        }
    );
    assert!(session.itinerary().total_distance_km() > 600.0);

    let route = session.save_itinerary(Some(" South of France ")).await.unwrap();
    assert_eq!(route.name(), "South of France");
    assert_eq!(route.starts_at(), date(1));
    assert_eq!(route.ends_at(), date(7));
    assert!(session.itinerary().is_empty());

    let stops: Vec<_> = route.stops().map(|(n, v)| (n, v.city_name.clone())).collect();
    assert_eq!(
        stops,
        vec![
            (1, "Paris".to_string()),
            (2, "Lyon".to_string()),
            (3, "Marseille".to_string()),
        ]
    );

    session.load_route(route.id()).unwrap();
    session.remove_city(CityId(2));
    let remaining: Vec<_> = session
        .itinerary()
        .current_sequence()
        .iter()
        .map(|v| v.date_range)
        .collect();
    // Removal leaves the gap as it is
    assert_eq!(remaining, vec![range(1, 5), range(7, 7)]);

    let second = session.save_itinerary(None).await.unwrap();
    assert_eq!(second.name(), "Route 2");
    assert_eq!(session.routes().len(), 2);
}

#[tokio::test]
async fn test_routes_survive_reopen_of_store() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(FjallRouteGateway::open(dir.path()).unwrap());

    let mut session = TripSession::new(RouteStore::open(gateway.clone()).await.unwrap());
    session.add_city(catalog().matching("Paris").remove(0), range(1, 2));
    let saved = session.save_itinerary(Some("Weekend")).await.unwrap();
    session.rename_route(saved.id(), "Long weekend").await.unwrap();

    let reopened = RouteStore::open(gateway).await.unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.list()[0].name(), "Long weekend");
    assert_eq!(reopened.list()[0].cities(), saved.cities());
}

#[tokio::test]
async fn test_errors_surface_to_caller() {
    let mut session = TripSession::new(RouteStore::in_memory());

    let inverted = DateRange::new(date(5), date(1));
    assert!(matches!(inverted, Err(RoutecastError::InvalidRange { .. })));

    let empty = session.save_itinerary(Some("Nothing")).await;
    assert!(matches!(empty, Err(RoutecastError::EmptyItinerary)));

    session.add_city(catalog().matching("Lyon").remove(0), range(1, 1));
    let route = session.save_itinerary(None).await.unwrap();

    let blank = session.rename_route(route.id(), "   ").await;
    assert!(matches!(blank, Err(RoutecastError::InvalidName)));
    assert_eq!(session.routes().get(route.id()).unwrap().name(), "Route 1");

    session.delete_route(route.id()).await.unwrap();
    let gone = session.load_route(route.id());
    assert!(matches!(gone, Err(RoutecastError::RouteNotFound { .. })));
    assert!(gone.is_err_and(|e| e.is_user_error()));
}
