use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single cookie. `expires` is an absolute second count since the Unix
/// epoch; `-1` is the session-cookie sentinel (see `store::apply_session_fixup`).
/// Unknown fields (path, secure, httpOnly, sameSite, ...) pass through
/// untouched via `extra`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_expires")]
    pub expires: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_expires() -> i64 {
    -1
}

pub type CookieJar = Vec<Cookie>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshSource {
    Scheduled,
    Manual,
    Startup,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct JarMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_source: Option<RefreshSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie_workaround: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookies_converted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_refresh: Option<String>,
}

/// On-disk shape of `{cookie_dir}/{domain}.json`. `metadata` defaults to
/// an empty struct if the key is absent, per Invariant I1's forward-compat
/// note.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JarFile {
    pub cookies: CookieJar,
    #[serde(default)]
    pub metadata: JarMetadata,
}

pub fn iso_now() -> String {
    format_iso(Utc::now())
}

pub fn format_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
