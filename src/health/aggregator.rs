use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cookie::store;

const EXPIRING_THRESHOLD_SECONDS: i64 = 24 * 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    Ok,
    Expiring,
    Expired,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteHealth {
    pub status: SiteStatus,
    pub cookies_count: usize,
    pub cookies_valid_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_refresh: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie_workaround: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Degraded,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub timestamp: String,
    pub sites: BTreeMap<String, SiteHealth>,
}

/// Compute a single site's health from its jar file. Any I/O or parse
/// failure yields `SiteStatus::Error` with the cause attached; the
/// aggregator never panics on a malformed jar.
pub fn site_health(jar_path: &Path) -> SiteHealth {
    match store::load(jar_path) {
        Ok((cookies, metadata)) => {
            let now = Utc::now().timestamp();
            let valid: Vec<_> = cookies.iter().filter(|c| c.expires > now).collect();

            if valid.is_empty() {
                return SiteHealth {
                    status: SiteStatus::Expired,
                    cookies_count: 0,
                    cookies_valid_until: None,
                    time_remaining_hours: Some(0.0),
                    last_refresh: metadata.refreshed_at,
                    next_refresh: metadata.next_refresh,
                    session_cookie_workaround: Some(metadata.session_cookie_workaround.unwrap_or(false)),
                    error: None,
                };
            }

            let min_expiry = valid.iter().map(|c| c.expires).min().unwrap();
            let time_remaining = (min_expiry - now) as f64;
            let valid_until = chrono::DateTime::<Utc>::from_timestamp(min_expiry, 0)
                .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
            let status = if time_remaining < EXPIRING_THRESHOLD_SECONDS as f64 {
                SiteStatus::Expiring
            } else {
                SiteStatus::Ok
            };

            SiteHealth {
                status,
                cookies_count: valid.len(),
                cookies_valid_until: valid_until,
                time_remaining_hours: Some((time_remaining / 3600.0 * 10.0).round() / 10.0),
                last_refresh: metadata.refreshed_at,
                next_refresh: metadata.next_refresh,
                session_cookie_workaround: Some(metadata.session_cookie_workaround.unwrap_or(false)),
                error: None,
            }
        }
        Err(e) => SiteHealth {
            status: SiteStatus::Error,
            cookies_count: 0,
            cookies_valid_until: None,
            time_remaining_hours: None,
            last_refresh: None,
            next_refresh: None,
            session_cookie_workaround: None,
            error: Some(e.to_string()),
        },
    }
}

/// Scan `cookie_dir` for `*.json` jar files (excluding the reserved
/// `.json.tmp` suffix) and build the full health report. Overall status is
/// `ok` only if every site is `ok`; `error` if there are no sites or every
/// site errored; `degraded` otherwise.
pub fn health_report(cookie_dir: &Path) -> HealthReport {
    let mut sites = BTreeMap::new();

    if let Ok(entries) = std::fs::read_dir(cookie_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let domain = store::domain_from_path(&path);
            sites.insert(domain, site_health(&path));
        }
    }

    let overall = if sites.is_empty() || sites.values().all(|s| s.status == SiteStatus::Error) {
        OverallStatus::Error
    } else if sites.values().all(|s| s.status == SiteStatus::Ok) {
        OverallStatus::Ok
    } else {
        OverallStatus::Degraded
    };

    HealthReport {
        status: overall,
        timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        sites,
    }
}
