//! HTTP service exposing the dataset and its metrics as JSON.
//!
//! Routes:
//! - `GET /api/ev-data`   decoded rows
//! - `GET /api/test-data` quick summary
//! - `GET /api/metrics`   metrics filtered by query (`?make=TESLA&county=King`)
//! - `GET /health`        liveness probe

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;

use ev_core::error::{DashboardError, Result};
use ev_core::models::FilterCriteria;
use ev_data::analysis::QuickSummary;
use serde::Serialize;
use tracing::{info, warn};
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

use crate::data_manager::{load_shared, SharedDataManager};

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "ev-dashboard";

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

fn error_reply(message: &str) -> WithStatus<Json> {
    json_reply(&ErrorResponse { error: message }, StatusCode::INTERNAL_SERVER_ERROR)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn health_check() -> std::result::Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    })))
}

async fn ev_data(manager: SharedDataManager) -> std::result::Result<impl Reply, Infallible> {
    match load_shared(&manager, false).await {
        Ok(result) => Ok(json_reply(&result.dataset.records, StatusCode::OK)),
        Err(e) => {
            warn!("Error reading or parsing dataset: {e}");
            Ok(error_reply("Failed to load data"))
        }
    }
}

async fn test_data(manager: SharedDataManager) -> std::result::Result<impl Reply, Infallible> {
    match load_shared(&manager, false).await {
        Ok(result) => {
            let summary = QuickSummary::from_metrics(&result.dataset.metrics);
            Ok(json_reply(&summary, StatusCode::OK))
        }
        Err(e) => {
            warn!("Error processing test data: {e}");
            Ok(error_reply("Failed to process data"))
        }
    }
}

async fn filtered_metrics(
    criteria: FilterCriteria,
    manager: SharedDataManager,
) -> std::result::Result<impl Reply, Infallible> {
    match load_shared(&manager, false).await {
        Ok(result) => {
            let metrics = result.dataset.apply_filter(&criteria);
            Ok(json_reply(&metrics, StatusCode::OK))
        }
        Err(e) => {
            warn!("Error computing metrics: {e}");
            Ok(error_reply("Failed to load data"))
        }
    }
}

async fn handle_rejection(err: Rejection) -> std::result::Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query")
    } else {
        warn!("Unhandled rejection: {err:?}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };
    Ok(json_reply(&ErrorResponse { error: message }, status))
}

// ── Routes ────────────────────────────────────────────────────────────────────

fn with_manager(
    manager: SharedDataManager,
) -> impl Filter<Extract = (SharedDataManager,), Error = Infallible> + Clone {
    warp::any().map(move || manager.clone())
}

/// All routes, with request logging and JSON error replies.
pub fn routes(
    manager: SharedDataManager,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let ev_data = warp::path!("api" / "ev-data")
        .and(warp::get())
        .and(with_manager(manager.clone()))
        .and_then(ev_data);

    let test_data = warp::path!("api" / "test-data")
        .and(warp::get())
        .and(with_manager(manager.clone()))
        .and_then(test_data);

    let metrics = warp::path!("api" / "metrics")
        .and(warp::get())
        .and(warp::query::<FilterCriteria>())
        .and(with_manager(manager))
        .and_then(filtered_metrics);

    let log = warp::log::custom(|info| {
        info!(
            "{} {} {} {:.1}ms",
            info.method(),
            info.path(),
            info.status().as_u16(),
            info.elapsed().as_secs_f64() * 1000.0
        );
    });

    health
        .or(ev_data)
        .or(test_data)
        .or(metrics)
        .with(log)
        .recover(handle_rejection)
}

/// Bind the service to `addr`.
///
/// Returns the bound address (useful with port `0`) and the server future,
/// which completes after `shutdown` resolves.
pub fn bind_server(
    manager: SharedDataManager,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = ()>)> {
    warp::serve(routes(manager))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| DashboardError::Config(format!("cannot bind {addr}: {e}")))
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    manager: SharedDataManager,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let (bound, server) = bind_server(manager, addr, shutdown)?;
    info!("HTTP service listening on http://{bound}");
    info!("Rows: http://{bound}/api/ev-data");
    info!("Summary: http://{bound}/api/test-data");
    server.await;
    info!("HTTP service stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_manager::DataManager;
    use crate::source::{DataSource, MemorySource};
    use ev_core::models::VehicleRecord;

    struct FailingSource;

    impl DataSource for FailingSource {
        fn fetch_raw_records(&self) -> Result<Vec<VehicleRecord>> {
            Err(DashboardError::Fetch("upstream unavailable".to_string()))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn manager() -> SharedDataManager {
        let records = vec![
            VehicleRecord::new("TESLA", "BEV", "2020", "220", "King"),
            VehicleRecord::new("TESLA", "BEV", "2022", "330", "Pierce"),
            VehicleRecord::new("NISSAN", "BEV", "2018", "0", "King"),
            VehicleRecord::new("KIA", "PHEV", "2021", "26", "King"),
        ];
        DataManager::new(Box::new(MemorySource::new(records)), 30).shared()
    }

    fn failing_manager() -> SharedDataManager {
        DataManager::new(Box::new(FailingSource), 30).shared()
    }

    fn body_json(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).expect("valid JSON body")
    }

    // ── /health ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let res = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&routes(manager()))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res.body());
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], SERVICE_NAME);
    }

    // ── /api/ev-data ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_ev_data_returns_rows() {
        let res = warp::test::request()
            .path("/api/ev-data")
            .reply(&routes(manager()))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()["content-type"].to_str().unwrap(),
            "application/json"
        );
        let json = body_json(res.body());
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["Make"], "TESLA");
        assert_eq!(rows[0]["Electric Range"], "220");
    }

    #[tokio::test]
    async fn test_ev_data_failure_is_500() {
        let res = warp::test::request()
            .path("/api/ev-data")
            .reply(&routes(failing_manager()))
            .await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(res.body())["error"], "Failed to load data");
    }

    // ── /api/test-data ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_test_data_summary() {
        let res = warp::test::request()
            .path("/api/test-data")
            .reply(&routes(manager()))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res.body());
        assert_eq!(json["totalVehicles"], 4);
        assert_eq!(json["topMakes"][0]["make"], "TESLA");
        assert_eq!(json["topMakes"][0]["count"], 2);
        assert_eq!(json["vehicleTypes"]["BEV"], 3);
        // (220 + 330 + 26) / 3 = 192
        assert_eq!(json["averageRange"], 192);
    }

    #[tokio::test]
    async fn test_test_data_failure_is_500() {
        let res = warp::test::request()
            .path("/api/test-data")
            .reply(&routes(failing_manager()))
            .await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(res.body())["error"], "Failed to process data");
    }

    // ── /api/metrics ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_metrics_unfiltered() {
        let res = warp::test::request()
            .path("/api/metrics")
            .reply(&routes(manager()))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res.body());
        assert_eq!(json["totalVehicles"], 4);
        assert_eq!(json["years"], serde_json::json!(["2018", "2020", "2021", "2022"]));
    }

    #[tokio::test]
    async fn test_metrics_filtered_by_query() {
        let res = warp::test::request()
            .path("/api/metrics?make=TESLA&county=King")
            .reply(&routes(manager()))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res.body());
        assert_eq!(json["totalVehicles"], 1);
        assert_eq!(json["electricRange"]["average"], 220);
    }

    #[tokio::test]
    async fn test_metrics_query_uses_camel_case_keys() {
        let res = warp::test::request()
            .path("/api/metrics?vehicleType=PHEV&modelYear=2021")
            .reply(&routes(manager()))
            .await;
        let json = body_json(res.body());
        assert_eq!(json["totalVehicles"], 1);
        assert_eq!(json["makes"]["KIA"], 1);
    }

    // ── rejections ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let res = warp::test::request()
            .path("/api/unknown")
            .reply(&routes(manager()))
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(res.body())["error"], "Not found");
    }

    #[tokio::test]
    async fn test_post_is_rejected() {
        let res = warp::test::request()
            .method("POST")
            .path("/api/ev-data")
            .reply(&routes(manager()))
            .await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    // ── bind_server ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_bind_server_ephemeral_port() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let (addr, server) = bind_server(manager(), ([127, 0, 0, 1], 0).into(), async {
            let _ = rx.await;
        })
        .unwrap();
        assert_ne!(addr.port(), 0);

        let task = tokio::spawn(server);
        let _ = tx.send(());
        tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .expect("server did not shut down")
            .unwrap();
    }
}
