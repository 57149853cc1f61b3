use std::path::Path;

use crate::cookie::{Freshness, classify, store};
use crate::domain::canonicalise;

use super::ProxyFlow;

/// Outcome of an injection attempt, surfaced to the caller for metrics/logs.
#[derive(Debug, PartialEq, Eq)]
pub enum InjectOutcome {
    Injected { domain: String, status: &'static str },
    ShortCircuited { domain: String, reason: &'static str },
    Skipped,
}

/// Inject cookies into a request, or short-circuit it with a 502.
///
/// Mirrors the hybrid failure handling of ADR-0001: an unparseable host is
/// passed through untouched (the proxy may be fronting non-paywalled
/// traffic); a missing jar, a malformed jar, or an all-expired jar each
/// short-circuit with a distinct `status` tag so an operator can tell them
/// apart; `expiring`/`ok` jars are injected with the same tag on
/// `X-Cookie-Injector-Status`.
pub fn inject(flow: &mut dyn ProxyFlow, cookie_dir: &Path) -> InjectOutcome {
    let host = flow.host();

    let domain = match canonicalise(&host) {
        Ok(d) => d,
        Err(_) => {
            tracing::warn!(host, "cannot_extract_domain_skipping");
            return InjectOutcome::Skipped;
        }
    };

    let jar_path = cookie_dir.join(format!("{domain}.json"));

    let (cookies, _metadata) = match store::load(&jar_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let reason = if jar_path.exists() { "error" } else { "missing" };
            tracing::warn!(domain, error = %e, reason, "cookie_load_failed");
            short_circuit(flow, &domain, reason);
            return InjectOutcome::ShortCircuited { domain, reason };
        }
    };

    let (freshness, valid) = classify(&cookies);

    if freshness == Freshness::Expired {
        tracing::warn!(domain, "all_cookies_expired");
        short_circuit(flow, &domain, "expired");
        return InjectOutcome::ShortCircuited { domain, reason: "expired" };
    }

    let status = freshness.as_str();
    let header_value = format_cookies(&valid);
    flow.set_request_header("Cookie", &header_value);
    flow.set_response_header("X-Cookie-Injector-Status", status);
    tracing::info!(domain, status, count = valid.len(), "cookies_injected");

    InjectOutcome::Injected { domain, status }
}

fn short_circuit(flow: &mut dyn ProxyFlow, domain: &str, reason: &str) {
    let body = serde_json::json!({
        "error": "cookie_injector_no_valid_cookies",
        "domain": domain,
        "message": format!("No valid authentication cookies available. Reason: {reason}"),
        "status": reason,
    });
    flow.set_response_header("Content-Type", "application/json");
    flow.set_response_header("X-Cookie-Injector-Status", reason);
    flow.respond_502(&body.to_string());
}

fn format_cookies(cookies: &[crate::cookie::Cookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::{Cookie, RefreshSource, save};
    use crate::proxy::TestFlow;
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

    #[test]
    fn unparseable_host_is_skipped_not_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = TestFlow::new("localhost");
        let outcome = inject(&mut flow, dir.path());
        assert_eq!(outcome, InjectOutcome::Skipped);
        assert!(flow.response_status.is_none());
    }

    #[test]
    fn missing_jar_short_circuits_502_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = TestFlow::new("www.nrc.nl");
        let outcome = inject(&mut flow, dir.path());
        assert_eq!(
            outcome,
            InjectOutcome::ShortCircuited { domain: "nrc.nl".to_string(), reason: "missing" }
        );
        assert_eq!(flow.response_status, Some(502));
        assert_eq!(
            flow.response_headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(
            flow.response_headers.get("X-Cookie-Injector-Status").map(String::as_str),
            Some("missing")
        );
    }

    #[test]
    fn malformed_jar_short_circuits_502_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nrc.nl.json"), "not json").unwrap();
        let mut flow = TestFlow::new("nrc.nl");
        let outcome = inject(&mut flow, dir.path());
        assert_eq!(
            outcome,
            InjectOutcome::ShortCircuited { domain: "nrc.nl".to_string(), reason: "error" }
        );
    }

    #[test]
    fn all_expired_short_circuits_502_expired() {
        let dir = tempfile::tempdir().unwrap();
        let past = chrono::Utc::now().timestamp() - 3600;
        save("nrc.nl", &[cookie("s", past)], dir.path(), RefreshSource::Scheduled, None).unwrap();
        let mut flow = TestFlow::new("nrc.nl");
        let outcome = inject(&mut flow, dir.path());
        assert_eq!(
            outcome,
            InjectOutcome::ShortCircuited { domain: "nrc.nl".to_string(), reason: "expired" }
        );
    }

    #[test]
    fn fresh_jar_injects_cookie_and_status_headers() {
        let dir = tempfile::tempdir().unwrap();
        let future = chrono::Utc::now().timestamp() + 48 * 3600;
        save("nrc.nl", &[cookie("a", future)], dir.path(), RefreshSource::Scheduled, None).unwrap();
        let mut flow = TestFlow::new("nrc.nl");
        let outcome = inject(&mut flow, dir.path());
        assert_eq!(outcome, InjectOutcome::Injected { domain: "nrc.nl".to_string(), status: "ok" });
        assert_eq!(flow.request_headers.get("Cookie").map(String::as_str), Some("a=v"));
        assert_eq!(
            flow.response_headers.get("X-Cookie-Injector-Status").map(String::as_str),
            Some("ok")
        );
        assert!(flow.response_status.is_none());
    }

    #[test]
    fn expiring_jar_is_injected_not_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let soon = chrono::Utc::now().timestamp() + 3600;
        save("nrc.nl", &[cookie("a", soon)], dir.path(), RefreshSource::Scheduled, None).unwrap();
        let mut flow = TestFlow::new("nrc.nl");
        let outcome = inject(&mut flow, dir.path());
        assert_eq!(outcome, InjectOutcome::Injected { domain: "nrc.nl".to_string(), status: "expiring" });
    }
}
