use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::config::SiteConfig;
use crate::cookie::{RefreshSource, save};
use crate::error::{
    CookieInjectorError, LoginTimedOutSnafu, NoLoginScriptSnafu, RefreshFailedSnafu,
};
use crate::login::LoginRegistry;
use crate::login::nrc::BrowserPage;

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_SECONDS: u64 = 5;
const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Seam to the external headless-browser driver's context/launch step.
/// The core never embeds a browser; a real deployment supplies a concrete
/// implementation that opens a fresh context per attempt and tears it down
/// on every exit path.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, domain: &str) -> Result<Box<dyn BrowserPage>, CookieInjectorError>;
}

/// Drive one site's login flow to completion, honoring the global
/// concurrency cap and retrying with exponential backoff. Never leaves a
/// partially-updated jar on disk (Invariant I5): on success the new jar is
/// saved immediately; on exhaustion of all attempts the prior jar, if any,
/// is untouched.
pub async fn refresh(
    site: &SiteConfig,
    gate: &Arc<Semaphore>,
    cookie_dir: &Path,
    registry: &LoginRegistry,
    launcher: &dyn BrowserLauncher,
) -> Result<(), CookieInjectorError> {
    let routine = registry
        .get(&site.domain)
        .ok_or_else(|| NoLoginScriptSnafu { domain: site.domain.clone() }.build())?;

    let mut last_error = String::new();

    for attempt in 1..=MAX_RETRIES {
        tracing::info!(domain = %site.domain, attempt, "refresh_attempt_starting");

        let attempt_result = run_attempt(site, gate, routine, launcher).await;

        match attempt_result {
            Ok(cookies) => {
                save(&site.domain, &cookies, cookie_dir, RefreshSource::Scheduled, None)?;
                tracing::info!(
                    domain = %site.domain,
                    attempt,
                    cookies_count = cookies.len(),
                    "refresh_succeeded"
                );
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(domain = %site.domain, attempt, error = %e, "refresh_attempt_failed");
                last_error = e.to_string();
                if attempt < MAX_RETRIES {
                    let backoff = BASE_BACKOFF_SECONDS * 2u64.pow(attempt - 1);
                    tracing::info!(domain = %site.domain, seconds = backoff, "backing_off");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                }
            }
        }
    }

    RefreshFailedSnafu {
        domain: site.domain.clone(),
        last_error,
    }
    .fail()
}

async fn run_attempt(
    site: &SiteConfig,
    gate: &Arc<Semaphore>,
    routine: &dyn crate::login::LoginRoutine,
    launcher: &dyn BrowserLauncher,
) -> Result<crate::cookie::CookieJar, CookieInjectorError> {
    let _permit = gate
        .acquire()
        .await
        .expect("concurrency gate semaphore should never be closed");
    tracing::info!(domain = %site.domain, "browser_acquired");

    let mut page = launcher.launch(&site.domain).await?;

    let login_future = routine.login(site, page.as_mut());
    let result = timeout(LOGIN_TIMEOUT, login_future).await;

    match result {
        Ok(inner) => inner,
        Err(_) => LoginTimedOutSnafu {
            domain: site.domain.clone(),
        }
        .fail(),
    }
}
