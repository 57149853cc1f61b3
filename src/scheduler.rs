use std::path::Path;

use chrono::Utc;

use crate::cookie::store;

/// Lower bound on the adaptive refresh interval (ADR-0003): 6 hours.
pub const MIN_INTERVAL: f64 = 6.0 * 3600.0;
/// Upper bound on the adaptive refresh interval (ADR-0003): 24 hours.
pub const MAX_INTERVAL: f64 = 24.0 * 3600.0;
/// If the next scheduled refresh is this far out at startup, skip the
/// immediate refresh attempt.
pub const STARTUP_SKIP_THRESHOLD: f64 = 6.0 * 3600.0;

const SAFETY_MARGIN: f64 = 0.75;

/// Compute how many seconds to sleep before the next refresh attempt for
/// `domain`. Returns `0` when the jar is missing, unreadable, or has no
/// cookie with `expires > now`; otherwise `clamp(lifetime * 0.75, MIN, MAX)`.
pub fn sleep_for_next(domain: &str, cookie_dir: &Path) -> f64 {
    let (cookies, _) = match store::load_domain(domain, cookie_dir) {
        Ok(loaded) => loaded,
        Err(_) => {
            tracing::info!(domain, "no_cookie_file_refresh_immediately");
            return 0.0;
        }
    };

    let now = Utc::now().timestamp();
    let min_expiry = cookies.iter().map(|c| c.expires).filter(|&e| e > now).min();

    let Some(min_expiry) = min_expiry else {
        tracing::info!(domain, "all_expired_refresh_immediately");
        return 0.0;
    };

    let lifetime = (min_expiry - now) as f64;
    let interval = (lifetime * SAFETY_MARGIN).clamp(MIN_INTERVAL, MAX_INTERVAL);

    tracing::info!(
        domain,
        lifetime_hours = lifetime / 3600.0,
        interval_hours = interval / 3600.0,
        "next_refresh_calculated"
    );
    interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::{Cookie, RefreshSource, save};
    use serde_json::Map;

    fn cookie(name: &str, expires: i64) -> Cookie {
        Cookie {
            name: name.to_string(),
            value: "v".to_string(),
            domain: "nrc.nl".to_string(),
            expires,
            extra: Map::new(),
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    #[test]
    fn missing_jar_returns_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(sleep_for_next("nrc.nl", dir.path()), 0.0);
    }

    #[test]
    fn all_expired_returns_zero() {
        let dir = tempfile::tempdir().unwrap();
        save("nrc.nl", &[cookie("s", now() - 3600)], dir.path(), RefreshSource::Scheduled, None).unwrap();
        assert_eq!(sleep_for_next("nrc.nl", dir.path()), 0.0);
    }

    #[test]
    fn fresh_24h_cookie_yields_18h() {
        let dir = tempfile::tempdir().unwrap();
        save(
            "nrc.nl",
            &[cookie("s", now() + 24 * 3600)],
            dir.path(),
            RefreshSource::Scheduled,
            None,
        )
        .unwrap();
        let result = sleep_for_next("nrc.nl", dir.path());
        assert!((17.9 * 3600.0..18.1 * 3600.0).contains(&result));
    }

    #[test]
    fn short_lifetime_clamps_to_min() {
        let dir = tempfile::tempdir().unwrap();
        save(
            "nrc.nl",
            &[cookie("s", now() + 4 * 3600)],
            dir.path(),
            RefreshSource::Scheduled,
            None,
        )
        .unwrap();
        assert_eq!(sleep_for_next("nrc.nl", dir.path()), MIN_INTERVAL);
    }

    #[test]
    fn long_lifetime_clamps_to_max() {
        let dir = tempfile::tempdir().unwrap();
        save(
            "nrc.nl",
            &[cookie("s", now() + 30 * 24 * 3600)],
            dir.path(),
            RefreshSource::Scheduled,
            None,
        )
        .unwrap();
        assert_eq!(sleep_for_next("nrc.nl", dir.path()), MAX_INTERVAL);
    }

    #[test]
    fn earliest_expiry_wins_in_mixed_jar() {
        let dir = tempfile::tempdir().unwrap();
        save(
            "nrc.nl",
            &[cookie("a", now() + 8 * 3600), cookie("b", now() + 48 * 3600)],
            dir.path(),
            RefreshSource::Scheduled,
            None,
        )
        .unwrap();
        assert_eq!(sleep_for_next("nrc.nl", dir.path()), MIN_INTERVAL);
    }

    #[test]
    fn never_in_open_interval_zero_to_min() {
        let dir = tempfile::tempdir().unwrap();
        save(
            "nrc.nl",
            &[cookie("s", now() + 3600)],
            dir.path(),
            RefreshSource::Scheduled,
            None,
        )
        .unwrap();
        let result = sleep_for_next("nrc.nl", dir.path());
        assert!(result == 0.0 || result >= MIN_INTERVAL);
    }
}
