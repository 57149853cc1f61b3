use chrono::Utc;

use super::model::{Cookie, CookieJar};

const EXPIRING_THRESHOLD_SECONDS: i64 = 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Expired,
    Expiring,
    Ok,
}

impl Freshness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Freshness::Expired => "expired",
            Freshness::Expiring => "expiring",
            Freshness::Ok => "ok",
        }
    }
}

/// Classify a cookie jar per ADR-0001's hybrid failure handling.
///
/// Cookies whose `expires` is not strictly greater than now (including the
/// `-1` session sentinel) are dropped from the returned subset. Order is
/// preserved so the proxy's Cookie header stays deterministic.
pub fn classify(cookies: &[Cookie]) -> (Freshness, CookieJar) {
    let now = Utc::now().timestamp();
    let valid: CookieJar = cookies.iter().filter(|c| c.expires > now).cloned().collect();

    if valid.is_empty() {
        return (Freshness::Expired, valid);
    }

    let min_expiry = valid.iter().map(|c| c.expires).min().unwrap();
    let status = if min_expiry - now < EXPIRING_THRESHOLD_SECONDS {
        Freshness::Expiring
    } else {
        Freshness::Ok
    };

    (status, valid)
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn all_expired_is_expired() {
        let (status, valid) = classify(&[cookie("s", now() - 3600)]);
        assert_eq!(status, Freshness::Expired);
        assert!(valid.is_empty());
    }

    #[test]
    fn within_24h_is_expiring() {
        let (status, valid) = classify(&[cookie("s", now() + 12 * 3600)]);
        assert_eq!(status, Freshness::Expiring);
        assert_eq!(valid.len(), 1);
    }

    #[test]
    fn beyond_24h_is_ok() {
        let (status, valid) = classify(&[cookie("s", now() + 48 * 3600)]);
        assert_eq!(status, Freshness::Ok);
        assert_eq!(valid.len(), 1);
    }

    #[test]
    fn mixed_jar_drops_expired_keeps_valid() {
        let (status, valid) = classify(&[
            cookie("expired", now() - 3600),
            cookie("valid", now() + 48 * 3600),
        ]);
        assert_eq!(status, Freshness::Ok);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].name, "valid");
    }

    #[test]
    fn earliest_expiry_decides_threshold() {
        let (status, valid) = classify(&[
            cookie("a", now() + 12 * 3600),
            cookie("b", now() + 48 * 3600),
        ]);
        assert_eq!(status, Freshness::Expiring);
        assert_eq!(valid.len(), 2);
    }

    #[test]
    fn session_sentinel_never_valid() {
        let (status, valid) = classify(&[cookie("s", -1)]);
        assert_eq!(status, Freshness::Expired);
        assert!(valid.is_empty());
    }
}
