use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::alerting::Alerter;
use crate::config::SiteConfig;
use crate::login::LoginRegistry;
use crate::refresh::{self, BrowserLauncher};
use crate::scheduler::{self, MIN_INTERVAL};

/// Drive one site's refresh lifecycle forever: on startup, refresh
/// immediately unless the existing jar is fresh enough to skip (ADR-0003);
/// thereafter always refresh, alert on failure, and sleep for the
/// adaptively computed interval before looping.
pub async fn run(
    site: SiteConfig,
    cookie_dir: std::path::PathBuf,
    gate: Arc<Semaphore>,
    registry: Arc<LoginRegistry>,
    launcher: Arc<dyn BrowserLauncher>,
    alerter: Arc<Alerter>,
) -> ! {
    let startup_wait = scheduler::sleep_for_next(&site.domain, &cookie_dir);
    if startup_wait >= scheduler::STARTUP_SKIP_THRESHOLD {
        tracing::info!(
            domain = %site.domain,
            seconds = startup_wait,
            "startup_refresh_skipped_jar_is_fresh"
        );
        tokio::time::sleep(Duration::from_secs_f64(startup_wait)).await;
    }

    loop {
        let result = refresh::refresh(&site, &gate, &cookie_dir, &registry, launcher.as_ref()).await;

        match &result {
            Ok(()) => {
                tracing::info!(domain = %site.domain, "site_loop_refresh_ok");
                alerter.liveness_ping(true).await;
            }
            Err(e) => {
                tracing::error!(domain = %site.domain, error = %e, "site_loop_refresh_failed");
                alerter.notify(&site.domain, &e.to_string()).await;
                alerter.liveness_ping(false).await;
            }
        }

        let mut interval = scheduler::sleep_for_next(&site.domain, &cookie_dir);
        if interval == 0.0 {
            interval = MIN_INTERVAL;
        }
        tracing::info!(domain = %site.domain, seconds = interval, "site_loop_sleeping");
        tokio::time::sleep(Duration::from_secs_f64(interval)).await;
    }
}
