//! HTTP surface of the climate API

use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;
use crate::error::ClimateApiError;
use crate::metrics;
use crate::models::{
    self, DateRange, PrecipitationMap, StartDate, StationEntry, TemperatureObservation,
    TemperatureStats,
};
use crate::queries;
use crate::query::Query;
use crate::validated_path::ValidatedPath;

use axum::{
    extract::State,
    response::Html,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;
use tracing::{event, Level};

/// Landing page listing the available routes.
const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Climate API</title>
</head>
<body>
  <h1>Climate API</h1>
  <p>Read-only JSON API over the climate dataset. Dates use the <code>YYYY-MM-DD</code> format.</p>
  <h2>Precipitation over the last 12 months of data</h2>
  <ul>
    <li><a href="/api/v1.0/precipitation">/api/v1.0/precipitation</a></li>
    <li>Format: <code>{"date": precipitation, ...}</code></li>
  </ul>
  <h2>Stations</h2>
  <ul>
    <li><a href="/api/v1.0/stations">/api/v1.0/stations</a></li>
    <li>Format: <code>[{"station": id, "name": name}, ...]</code></li>
  </ul>
  <h2>Temperature observations of the most active station over the last 12 months of data</h2>
  <ul>
    <li><a href="/api/v1.0/tobs">/api/v1.0/tobs</a></li>
    <li>Format: <code>[[date, temperature], ...]</code></li>
  </ul>
  <h2>Daily temperature statistics from a start date</h2>
  <ul>
    <li><a href="/api/v1.0/2017-03-14">/api/v1.0/{start}</a></li>
    <li>Format: <code>[[date, min, avg, max], ...]</code></li>
  </ul>
  <h2>Daily temperature statistics between a start date and an end date</h2>
  <ul>
    <li><a href="/api/v1.0/2017-08-01/2017-08-07">/api/v1.0/{start}/{end}</a></li>
    <li>Format: <code>[[date, min, avg, max], ...]</code></li>
  </ul>
</body>
</html>
"#;

/// Service type returned by [service].
pub type Service = NormalizePath<Router>;

/// Returns a [crate::app::Service] with all routes and appropriate middleware layers.
///
/// Fails if the climate store cannot be opened or does not match the declared schema.
pub fn service(args: &CommandLineArgs) -> Result<Service, ClimateApiError> {
    let state: SharedAppState = Arc::new(AppState::new(args)?);
    Ok(NormalizePathLayer::trim_trailing_slash().layer(router(state)))
}

/// Returns a [axum::Router] with all routes, bound to `state`.
pub fn router(state: SharedAppState) -> Router {
    fn v1() -> Router<SharedAppState> {
        Router::new()
            .route("/precipitation", get(precipitation))
            .route("/stations", get(stations))
            .route("/tobs", get(tobs))
            .route("/:start", get(temperature_stats_from))
            .route("/:start/:end", get(temperature_stats_range))
    }

    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api/v1.0", v1())
        .layer(
            TraceLayer::new_for_http()
                .on_request(metrics::request_counter)
                .on_response(metrics::record_response_metrics),
        )
        .with_state(state)
}

/// Run a query on a connection of its own.
///
/// The connection is opened on the blocking thread pool and dropped there once the query
/// completes, before the connection permit is released. The permit moves with the blocking task,
/// so it stays held even if the request is dropped while the query runs.
async fn run_query<Q: Query>(state: &AppState, query: Q) -> Result<Q::Output, ClimateApiError> {
    let permit = state.resource_manager.connection().await?;
    let store = state.store.clone();
    let span = tracing::debug_span!("query", name = Q::NAME);
    let result = tokio::task::spawn_blocking(move || {
        // Declared first so that the permit outlives the connection.
        let _permit = permit;
        span.in_scope(|| {
            event!(Level::DEBUG, "Opening climate store connection");
            let connection = store.connect()?;
            query.execute(&connection)
        })
    })
    .await?;
    metrics::record_query(Q::NAME, result.is_ok());
    result
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn precipitation(
    State(state): State<SharedAppState>,
) -> Result<Json<PrecipitationMap>, ClimateApiError> {
    event!(Level::DEBUG, "Received request for precipitation");
    run_query(&state, queries::PrecipitationLastYear {})
        .await
        .map(Json)
}

async fn stations(
    State(state): State<SharedAppState>,
) -> Result<Json<Vec<StationEntry>>, ClimateApiError> {
    event!(Level::DEBUG, "Received request for stations");
    run_query(&state, queries::ListStations {}).await.map(Json)
}

async fn tobs(
    State(state): State<SharedAppState>,
) -> Result<Json<Vec<TemperatureObservation>>, ClimateApiError> {
    event!(Level::DEBUG, "Received request for tobs");
    run_query(&state, queries::MostActiveStationObservations {})
        .await
        .map(Json)
}

async fn temperature_stats_from(
    State(state): State<SharedAppState>,
    ValidatedPath(params): ValidatedPath<StartDate>,
) -> Result<Json<Vec<TemperatureStats>>, ClimateApiError> {
    event!(
        Level::DEBUG,
        "Received request for temperature stats from {}",
        params.start
    );
    let query = queries::TemperatureStatsFrom {
        start: models::canonical_date(&params.start),
    };
    run_query(&state, query).await.map(Json)
}

async fn temperature_stats_range(
    State(state): State<SharedAppState>,
    ValidatedPath(params): ValidatedPath<DateRange>,
) -> Result<Json<Vec<TemperatureStats>>, ClimateApiError> {
    event!(
        Level::DEBUG,
        "Received request for temperature stats from {} to {}",
        params.start,
        params.end
    );
    let query = queries::TemperatureStatsRange {
        start: models::canonical_date(&params.start),
        end: models::canonical_date(&params.end),
    };
    run_query(&state, query).await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ErrorKind;
    use crate::test_utils::{self, sample_measurements};

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use clap::Parser;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt; // for `oneshot` and `ready`

    // Build a service over a database holding the given measurements.
    fn test_service(measurements: &[crate::models::Measurement]) -> (TempDir, Service) {
        let (dir, store) = test_utils::get_test_store(measurements);
        let args = CommandLineArgs::parse_from([
            "climate-api",
            "--database",
            store.path().to_str().unwrap(),
            "--connection-limit",
            "2",
        ]);
        (dir, service(&args).unwrap())
    }

    // Make a oneshot GET request.
    async fn request(service: &Service, uri: &str) -> Response {
        service
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    // Jump through the hoops to get the body as bytes.
    async fn body_bytes(response: Response) -> Vec<u8> {
        hyper::body::to_bytes(response.into_body())
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn index() {
        let (_dir, service) = test_service(&sample_measurements());
        let response = request(&service, "/").await;
        assert_eq!(StatusCode::OK, response.status());
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.trim_end().ends_with("</html>"));
        assert!(body.contains("/api/v1.0/precipitation"));
    }

    #[tokio::test]
    async fn precipitation() {
        let (_dir, service) = test_service(&sample_measurements());
        let response = request(&service, "/api/v1.0/precipitation").await;
        assert_eq!(StatusCode::OK, response.status());
        let body = body_json(response).await;
        let map = body.as_object().unwrap();
        let dates: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(
            vec!["2016-08-23", "2017-08-01", "2017-08-07", "2017-08-23"],
            dates
        );
        assert_eq!(Value::Null, map["2017-08-07"]);
    }

    #[tokio::test]
    async fn precipitation_no_data() {
        let (_dir, service) = test_service(&[]);
        let response = request(&service, "/api/v1.0/precipitation").await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        let body = body_json(response).await;
        assert_eq!(json!(ErrorKind::NoDataAvailable), body["error"]);
        assert_eq!(json!("no data available for precipitation"), body["message"]);
    }

    #[tokio::test]
    async fn stations() {
        let (_dir, service) = test_service(&sample_measurements());
        let response = request(&service, "/api/v1.0/stations").await;
        assert_eq!(StatusCode::OK, response.status());
        let body = body_json(response).await;
        assert_eq!(
            json!([
                {"station": "USC00519397", "name": "WAIKIKI 717.2, HI US"},
                {"station": "USC00519281", "name": "WAIHEE 837.5, HI US"},
                {"station": "USC00513117", "name": "KANEOHE 838.1, HI US"},
            ]),
            body
        );
    }

    #[tokio::test]
    async fn tobs() {
        let (_dir, service) = test_service(&sample_measurements());
        let response = request(&service, "/api/v1.0/tobs").await;
        assert_eq!(StatusCode::OK, response.status());
        let body = body_json(response).await;
        assert_eq!(
            json!([
                ["2016-08-23", 77.0],
                ["2017-08-01", 70.0],
                ["2017-08-07", 80.0],
                ["2017-08-23", 76.0],
            ]),
            body
        );
    }

    #[tokio::test]
    async fn temperature_stats_range() {
        let (_dir, service) = test_service(&sample_measurements());
        let response = request(&service, "/api/v1.0/2017-08-01/2017-08-07").await;
        assert_eq!(StatusCode::OK, response.status());
        let body = body_json(response).await;
        let rows = body.as_array().unwrap();
        assert_eq!(2, rows.len());
        let first = rows[0].as_array().unwrap();
        assert_eq!(4, first.len());
        assert_eq!(json!("2017-08-01"), first[0]);
        assert_eq!(70.0, first[1].as_f64().unwrap());
        assert!((first[2].as_f64().unwrap() - 72.333).abs() < 0.001);
        assert_eq!(75.0, first[3].as_f64().unwrap());
        assert_eq!(json!(["2017-08-07", 80.0, 80.0, 80.0]), rows[1]);
    }

    #[tokio::test]
    async fn temperature_stats_from_after_all_data() {
        let (_dir, service) = test_service(&sample_measurements());
        let response = request(&service, "/api/v1.0/9999-01-01").await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(json!([]), body_json(response).await);
    }

    #[tokio::test]
    async fn temperature_stats_range_far_future_matches_from() {
        let (_dir, service) = test_service(&sample_measurements());
        let from = body_bytes(request(&service, "/api/v1.0/2016-08-23").await).await;
        let range = body_bytes(request(&service, "/api/v1.0/2016-08-23/9999-12-31").await).await;
        assert_eq!(from, range);
    }

    #[tokio::test]
    async fn temperature_stats_invalid_date() {
        let (_dir, service) = test_service(&sample_measurements());
        let response = request(&service, "/api/v1.0/2017-13-01").await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        let body = body_json(response).await;
        assert_eq!(json!(ErrorKind::InvalidParameter), body["error"]);
    }

    #[tokio::test]
    async fn temperature_stats_five_digit_year() {
        let (_dir, service) = test_service(&sample_measurements());
        for uri in [
            "/api/v1.0/+10000-01-01",
            "/api/v1.0/2017-08-01/+10000-01-01",
            "/api/v1.0/-0001-01-01/2017-08-07",
        ] {
            let response = request(&service, uri).await;
            assert_eq!(StatusCode::BAD_REQUEST, response.status(), "uri: {uri}");
            let body = body_json(response).await;
            assert_eq!(json!(ErrorKind::InvalidParameter), body["error"], "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn repeated_requests_are_identical() {
        let (_dir, service) = test_service(&sample_measurements());
        for uri in [
            "/api/v1.0/precipitation",
            "/api/v1.0/stations",
            "/api/v1.0/tobs",
            "/api/v1.0/2010-01-01",
        ] {
            let first = body_bytes(request(&service, uri).await).await;
            let second = body_bytes(request(&service, uri).await).await;
            assert_eq!(first, second, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn trailing_slash() {
        let (_dir, service) = test_service(&sample_measurements());
        let response = request(&service, "/api/v1.0/stations/").await;
        assert_eq!(StatusCode::OK, response.status());
    }

    #[tokio::test]
    async fn unknown_route() {
        let (_dir, service) = test_service(&sample_measurements());
        let response = request(&service, "/api/v2.0/stations").await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[tokio::test]
    async fn metrics() {
        let (_dir, service) = test_service(&sample_measurements());
        let response = request(&service, "/metrics").await;
        assert_eq!(StatusCode::OK, response.status());
    }

    #[tokio::test]
    async fn store_removed_after_startup() {
        let (dir, service) = test_service(&sample_measurements());
        drop(dir);
        let response = request(&service, "/api/v1.0/stations").await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        let body = body_json(response).await;
        assert_eq!(json!(ErrorKind::StoreUnavailable), body["error"]);
    }

    #[test]
    fn service_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sqlite");
        let args =
            CommandLineArgs::parse_from(["climate-api", "--database", path.to_str().unwrap()]);
        let error = service(&args).unwrap_err();
        assert_eq!(ErrorKind::StoreUnavailable, error.kind());
    }
}
