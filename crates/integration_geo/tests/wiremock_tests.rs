//! Integration tests for the geocoding and routing clients (wiremock-based)

use std::sync::Arc;
use std::time::{Duration, Instant};

use domain::{BoundingBox, Coordinate};
use wiremock::matchers::{header_exists, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use integration_geo::{
    GeocodingClient, GeocodingConfig, GeocodingError, NominatimGeocodingClient, OsrmRoutingClient,
    RouteRequest, RoutingClient, RoutingConfig, RoutingError, SearchOptions, SearchSession,
};

fn geocoding_config(base_url: &str) -> GeocodingConfig {
    GeocodingConfig {
        base_url: base_url.to_string(),
        ..GeocodingConfig::for_testing()
    }
}

fn routing_config(server: &MockServer) -> (RoutingConfig, u16) {
    let config = RoutingConfig::for_testing();
    (config, server.address().port())
}

const fn sample_search_json() -> &'static str {
    r#"[
        {
            "display_name": "Sukiennice, Rynek Główny, Stare Miasto, Kraków",
            "lat": "50.0617",
            "lon": "19.9373",
            "type": "attraction",
            "importance": 0.62,
            "boundingbox": ["50.0612", "50.0622", "19.9366", "19.9381"]
        },
        {
            "display_name": "Rynek Główny, Kraków",
            "lat": "50.0614",
            "lon": "19.9372",
            "type": "square",
            "importance": 0.55,
            "boundingbox": ["50.0605", "50.0623", "19.9358", "19.9386"]
        }
    ]"#
}

const fn sample_reverse_json() -> &'static str {
    r#"{
        "display_name": "15, Floriańska, Stare Miasto, Kraków, Polska",
        "address": {
            "road": "Floriańska",
            "house_number": "15",
            "city": "Kraków",
            "country": "Polska"
        }
    }"#
}

const fn sample_route_json() -> &'static str {
    r#"{
        "code": "Ok",
        "routes": [{
            "distance": 2346.0,
            "duration": 1680.0,
            "geometry": "_p~iF~ps|U_ulLnnqC_mqNvxq`@",
            "legs": [{
                "steps": [
                    { "maneuver": { "type": "depart" }, "name": "Floriańska", "distance": 400 },
                    { "maneuver": { "type": "turn", "modifier": "left" }, "name": "Grodzka", "distance": 1946 },
                    { "maneuver": { "type": "arrive" }, "name": "", "distance": 0 }
                ]
            }]
        }]
    }"#
}

fn krakow_bbox() -> BoundingBox {
    BoundingBox::new(19.79, 49.97, 20.22, 50.13)
}

// --- Geocoding ---

#[tokio::test]
async fn test_search_success_and_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Sukiennice"))
        .and(query_param("format", "json"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_search_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new(&geocoding_config(&server.uri())).unwrap();
    let options = SearchOptions::default();

    let first = client.search_address("Sukiennice", &options).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].place_type, "attraction");
    assert!((first[0].lat - 50.0617).abs() < 1e-9);

    let second = client.search_address("Sukiennice", &options).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_search_cache_ignores_case_and_spacing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_search_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new(&geocoding_config(&server.uri())).unwrap();
    let options = SearchOptions::default();

    client.search_address("Rynek Główny", &options).await.unwrap();
    client.search_address("  rynek   główny ", &options).await.unwrap();
}

#[tokio::test]
async fn test_distinct_bounding_boxes_are_cached_separately() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("bounded", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_search_json()))
        .expect(2)
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new(&geocoding_config(&server.uri())).unwrap();
    let krakow = SearchOptions::default().with_bounding_box(krakow_bbox());
    let old_town = SearchOptions::default().with_bounding_box(BoundingBox::new(19.92, 50.05, 19.95, 50.07));

    client.search_address("Rynek", &krakow).await.unwrap();
    client.search_address("Rynek", &old_town).await.unwrap();
    // Both now cached
    client.search_address("Rynek", &krakow).await.unwrap();
    client.search_address("Rynek", &old_town).await.unwrap();
}

#[tokio::test]
async fn test_search_sends_viewbox_and_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("viewbox", "19.79,49.97,20.22,50.13"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new(&geocoding_config(&server.uri())).unwrap();
    let options = SearchOptions::default()
        .with_bounding_box(krakow_bbox())
        .with_limit(3);

    let results = client.search_address("Wawel", &options).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_search_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new(&geocoding_config(&server.uri())).unwrap();
    let err = client
        .search_address("Wawel", &SearchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GeocodingError::Api { status: 503, .. }));
    assert!(err.is_retryable());
    // Failures are not cached
    assert_eq!(client.cache().entry_count().await, 0);
}

#[tokio::test]
async fn test_search_unreachable_engine_is_transport_error() {
    let client = NominatimGeocodingClient::new(&geocoding_config("http://127.0.0.1:1")).unwrap();

    let err = client
        .search_address("Wawel", &SearchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GeocodingError::Transport(_)));
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_search_json()))
        .expect(2)
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new(&geocoding_config(&server.uri())).unwrap();
    let options = SearchOptions::default();

    client.search_address("Sukiennice", &options).await.unwrap();
    client.clear_cache().await;
    client.search_address("Sukiennice", &options).await.unwrap();
}

#[tokio::test]
async fn test_clear_cache_during_search_is_not_undone() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sample_search_json())
                .set_delay(Duration::from_millis(200)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new(&geocoding_config(&server.uri())).unwrap();
    let options = SearchOptions::default();

    let (results, ()) = tokio::join!(client.search_address("Sukiennice", &options), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.clear_cache().await;
    });
    assert_eq!(results.unwrap().len(), 2);
    assert_eq!(client.cache().entry_count().await, 0);

    client.search_address("Sukiennice", &options).await.unwrap();
    assert_eq!(client.cache().entry_count().await, 1);
}

#[tokio::test]
async fn test_reverse_formats_polish_address() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "50.0625"))
        .and(query_param("lon", "19.9397"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_reverse_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new(&geocoding_config(&server.uri())).unwrap();

    let result = client
        .get_address_from_coordinates(50.0625, 19.9397)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.formatted_address, "ul. Floriańska 15");
    assert_eq!(result.city.as_deref(), Some("Kraków"));

    // Second lookup served from cache
    let cached = client
        .get_address_from_coordinates(50.0625, 19.9397)
        .await
        .unwrap();
    assert_eq!(cached, Some(result));
}

#[tokio::test]
async fn test_reverse_not_found_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{ "error": "Unable to geocode" }"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new(&geocoding_config(&server.uri())).unwrap();

    assert!(client
        .get_address_from_coordinates(0.0, -30.0)
        .await
        .unwrap()
        .is_none());
    // The empty answer is cached as well
    assert!(client
        .get_address_from_coordinates(0.0, -30.0)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_queue_serializes_concurrent_searches() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(200);

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("[]")
                .set_delay(delay),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new_shared(&geocoding_config(&server.uri())).unwrap();
    let options = SearchOptions::default();

    let start = Instant::now();
    let (first, second) = tokio::join!(
        client.search_address("Kazimierz", &options),
        client.search_address("Podgórze", &options),
    );
    first.unwrap();
    second.unwrap();

    assert!(start.elapsed() >= delay * 2);
}

#[tokio::test]
async fn test_debounced_burst_issues_one_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_search_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(0)
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new_shared(&geocoding_config(&server.uri())).unwrap();
    let session = SearchSession::new(client, Duration::from_millis(50));
    let mut updates = session.subscribe();

    session.debounced_search("a");
    session.debounced_search("ab");
    session.debounced_search("abc");

    let state = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.query == "abc" && !s.loading),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    assert_eq!(state.results.len(), 2);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_superseded_search_still_completes_and_is_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Wawel"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sample_search_json())
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let client = NominatimGeocodingClient::new_shared(&geocoding_config(&server.uri())).unwrap();
    let session = SearchSession::new(client.clone(), Duration::from_millis(100));
    let mut updates = session.subscribe();

    session.debounced_search("Wawel");
    // Wawel is on the wire by now
    tokio::time::sleep(Duration::from_millis(250)).await;
    session.debounced_search("Kraków");

    let state = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.query == "Kraków" && !s.loading),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert!(state.results.is_empty());

    // Served from the cache filled by the superseded request
    let cached = client
        .search_address("Wawel", &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(cached.len(), 2);
}

// --- Routing ---

fn krakow_request(port: u16) -> RouteRequest {
    RouteRequest::new(vec![
        Coordinate::new_unchecked(19.9397, 50.0625),
        Coordinate::new_unchecked(19.9355, 50.054),
    ])
    .with_port(port)
}

#[tokio::test]
async fn test_route_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route/v1/foot/19.9397,50.0625;19.9355,50.054"))
        .and(query_param("overview", "full"))
        .and(query_param("steps", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_route_json()))
        .expect(1)
        .mount(&server)
        .await;

    let (config, port) = routing_config(&server);
    let client = OsrmRoutingClient::new(&config).unwrap();

    let route = client.calculate_route(&krakow_request(port)).await.unwrap();

    assert_eq!(route.path.len(), 3);
    assert!((route.path[0].lon() - -120.2).abs() < 1e-5);
    assert!((route.path[0].lat() - 38.5).abs() < 1e-5);
    assert_eq!(route.instructions.len(), 3);
    assert_eq!(route.instructions[1].text, "Skręć w lewo: Grodzka");
    assert_eq!(route.instructions[2].text, "Dotarłeś do celu");
    assert_eq!(route.format_summary(), "2.35 km, 28 min");
}

#[tokio::test]
async fn test_route_no_route_and_no_segment_are_distinct() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex("^/route/v1/foot/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{ "code": "NoRoute", "message": "Impossible route between points" }"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/route/v1/car/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{ "code": "NoSegment", "message": "Could not find a matching segment" }"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (config, port) = routing_config(&server);
    let client = OsrmRoutingClient::new(&config).unwrap();

    let no_route = client
        .calculate_route(&krakow_request(port))
        .await
        .unwrap_err();
    let no_segment = client
        .calculate_route(&krakow_request(port).with_profile("car"))
        .await
        .unwrap_err();

    assert!(matches!(no_route, RoutingError::NoRoute { ref message } if message.contains("Impossible")));
    assert!(matches!(no_segment, RoutingError::NoSegment { .. }));
    assert_eq!(no_route.code(), Some("NoRoute"));
    assert_eq!(no_segment.code(), Some("NoSegment"));
}

#[tokio::test]
async fn test_route_error_code_in_4xx_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex("^/route/v1/.*"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{ "code": "InvalidQuery", "message": "Query string malformed close to position 28" }"#,
        ))
        .mount(&server)
        .await;

    let (config, port) = routing_config(&server);
    let client = OsrmRoutingClient::new(&config).unwrap();

    let err = client
        .calculate_route(&krakow_request(port))
        .await
        .unwrap_err();
    assert!(matches!(err, RoutingError::Engine { ref code, .. } if code == "InvalidQuery"));
}

#[tokio::test]
async fn test_route_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex("^/route/v1/.*"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
        .mount(&server)
        .await;

    let (config, port) = routing_config(&server);
    let client = OsrmRoutingClient::new(&config).unwrap();

    let err = client
        .calculate_route(&krakow_request(port))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RoutingError::Http { status: 500, ref status_text } if status_text == "Internal Server Error"
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_route_single_waypoint_never_hits_engine() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_route_json()))
        .expect(0)
        .mount(&server)
        .await;

    let (config, port) = routing_config(&server);
    let client = OsrmRoutingClient::new(&config).unwrap();
    let request =
        RouteRequest::new(vec![Coordinate::new_unchecked(19.9397, 50.0625)]).with_port(port);

    let err = client.calculate_route(&request).await.unwrap_err();
    assert!(matches!(err, RoutingError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_route_planner_keeps_route_on_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex("^/route/v1/foot/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_route_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/route/v1/bike/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{ "code": "NoRoute" }"#))
        .mount(&server)
        .await;

    let (config, port) = routing_config(&server);
    let planner =
        integration_geo::RoutePlanner::new(Arc::new(OsrmRoutingClient::new(&config).unwrap()));

    let shown = planner.plan(&krakow_request(port)).await.unwrap().unwrap();
    assert!(planner
        .plan(&krakow_request(port).with_profile("bike"))
        .await
        .is_err());
    assert_eq!(planner.current().await, Some(shown));
}
