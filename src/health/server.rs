use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use axum::{Json, Router, extract::State, routing::get};
use moka::sync::Cache;
use tower_http::trace::TraceLayer;

use super::aggregator::{self, HealthReport};

/// Health report responses change only as often as a refresh cycle
/// completes; a short TTL cache avoids re-scanning the cookie directory on
/// every dashboard poll.
static REPORT_CACHE: LazyLock<Cache<(), HealthReport>> = LazyLock::new(|| {
    Cache::builder()
        .max_capacity(1)
        .time_to_live(Duration::from_secs(2))
        .build()
});

#[derive(Clone)]
struct HealthState {
    cookie_dir: Arc<PathBuf>,
}

fn cached_report(cookie_dir: &PathBuf) -> HealthReport {
    if let Some(report) = REPORT_CACHE.get(&()) {
        return report;
    }
    let report = aggregator::health_report(cookie_dir);
    REPORT_CACHE.insert((), report.clone());
    report
}

async fn serve_health(State(state): State<HealthState>) -> Json<HealthReport> {
    let report = cached_report(&state.cookie_dir);
    tracing::info!(status = ?report.status, "health_served");
    Json(report)
}

/// Builder for the health aggregator's HTTP surface (C8), in the same
/// chained-method style as the rest of the service's router assembly.
pub struct RouterBuilder {
    cookie_dir: PathBuf,
    inner: Router,
}

impl RouterBuilder {
    pub fn new(cookie_dir: PathBuf) -> Self {
        RouterBuilder {
            cookie_dir,
            inner: Router::new(),
        }
    }

    pub fn with_default_setup(self) -> Self {
        self.route_health_endpoints()
            .setup_static_serving()
            .with_tower_trace()
    }

    fn route_health_endpoints(mut self) -> Self {
        let state = HealthState {
            cookie_dir: Arc::new(self.cookie_dir.clone()),
        };
        let router = Router::new()
            .route("/", get(serve_health))
            .route("/health", get(serve_health))
            .with_state(state);
        self.inner = self.inner.merge(router);
        self
    }

    fn setup_static_serving(mut self) -> Self {
        #[cfg(feature = "embed-resource")]
        {
            use include_dir::{Dir, include_dir};
            const INCLUDE_STATIC: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");
            self.inner = self
                .inner
                .fallback_service(tower_serve_static::ServeDir::new(&INCLUDE_STATIC));
        }
        #[cfg(feature = "external-resource")]
        {
            use tower_http::services::ServeDir;
            self.inner = self
                .inner
                .fallback_service(ServeDir::new(format!("{}/static", env!("CARGO_MANIFEST_DIR"))));
        }
        self
    }

    fn with_tower_trace(mut self) -> Self {
        self.inner = self.inner.layer(TraceLayer::new_for_http());
        self
    }

    pub fn build(self) -> Router {
        self.inner
    }
}

/// Start listening on `0.0.0.0:{port}` and serve forever. `port` defaults
/// to `HEALTH_PORT`, then 8081, matching the original deployment's
/// convention.
pub async fn run(cookie_dir: PathBuf, port: u16) -> std::io::Result<()> {
    let router = RouterBuilder::new(cookie_dir).with_default_setup().build();
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "health_server_starting");
    axum::serve(listener, router).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_produces_a_router() {
        let dir = tempfile::tempdir().unwrap();
        let _router = RouterBuilder::new(dir.path().to_path_buf())
            .with_default_setup()
            .build();
    }
}
