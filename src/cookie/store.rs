use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use snafu::ResultExt;

use super::model::{Cookie, CookieJar, JarFile, JarMetadata, RefreshSource, iso_now};
use crate::error::{CookieInjectorError, JarMalformedSnafu, JarMissingSnafu, StoreIoSnafu};

const SESSION_COOKIE_TTL_SECONDS: i64 = 30 * 24 * 3600;

/// Replace every session cookie (`expires == -1`) with a shallow copy whose
/// expiry is `now + 30 days`. Non-session cookies are copied through
/// unchanged. The input slice is never mutated (Invariant I3, P2).
pub fn apply_session_fixup(cookies: &[Cookie]) -> CookieJar {
    let now = Utc::now().timestamp();
    cookies
        .iter()
        .map(|c| {
            let mut c = c.clone();
            if c.expires == -1 {
                c.expires = now + SESSION_COOKIE_TTL_SECONDS;
                tracing::info!(
                    cookie_name = %c.name,
                    domain = %c.domain,
                    expires = c.expires,
                    "session_cookie_workaround_applied"
                );
            }
            c
        })
        .collect()
}

fn jar_path(cookie_dir: &Path, domain: &str) -> PathBuf {
    cookie_dir.join(format!("{domain}.json"))
}

fn tmp_path(cookie_dir: &Path, domain: &str) -> PathBuf {
    cookie_dir.join(format!("{domain}.json.tmp"))
}

/// Atomically persist `raw_cookies` for `domain`. Applies the session
/// cookie fix-up, writes `{domain}.json.tmp`, fsyncs its data, then renames
/// over `{domain}.json` (rename is atomic within the same directory, see
/// Invariant I2/I5). On any failure before the rename, the prior jar file,
/// if any, is left untouched.
pub fn save(
    domain: &str,
    raw_cookies: &[Cookie],
    cookie_dir: &Path,
    refresh_source: RefreshSource,
    next_refresh_at: Option<String>,
) -> Result<(), CookieInjectorError> {
    fs::create_dir_all(cookie_dir).context(StoreIoSnafu {
        domain: domain.to_string(),
    })?;

    let processed = apply_session_fixup(raw_cookies);
    let session_cookies_converted = raw_cookies.iter().filter(|c| c.expires == -1).count();

    let metadata = JarMetadata {
        refreshed_at: Some(iso_now()),
        refresh_source: Some(refresh_source),
        site_config: Some(domain.to_string()),
        cookies_count: Some(processed.len()),
        session_cookie_workaround: Some(session_cookies_converted > 0),
        session_cookies_converted: Some(session_cookies_converted),
        next_refresh: next_refresh_at,
    };

    let jar_file = JarFile {
        cookies: processed,
        metadata,
    };

    let tmp = tmp_path(cookie_dir, domain);
    let target = jar_path(cookie_dir, domain);

    let write_result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        let encoded = serde_json::to_vec_pretty(&jar_file)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        file.write_all(&encoded)?;
        file.sync_all()?;
        Ok(())
    })();

    if let Err(e) = write_result {
        let _ = fs::remove_file(&tmp);
        return Err(e).context(StoreIoSnafu {
            domain: domain.to_string(),
        });
    }

    fs::rename(&tmp, &target).context(StoreIoSnafu {
        domain: domain.to_string(),
    })?;

    tracing::info!(domain, cookies_count = jar_file.cookies.len(), "cookies_saved");
    Ok(())
}

/// Load cookies and metadata from a jar file path.
pub fn load(path: &Path) -> Result<(CookieJar, JarMetadata), CookieInjectorError> {
    let domain = domain_from_path(path);

    if !path.exists() {
        return JarMissingSnafu { domain }.fail();
    }

    let raw = fs::read_to_string(path).map_err(|_| {
        JarMalformedSnafu {
            domain: domain.clone(),
            msg: "could not read jar file".to_string(),
        }
        .build()
    })?;

    let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        JarMalformedSnafu {
            domain: domain.clone(),
            msg: e.to_string(),
        }
        .build()
    })?;

    let Some(cookies_value) = value.get("cookies") else {
        return JarMalformedSnafu {
            domain,
            msg: "missing 'cookies' key".to_string(),
        }
        .fail();
    };

    let cookies: CookieJar = serde_json::from_value(cookies_value.clone()).map_err(|e| {
        JarMalformedSnafu {
            domain: domain.clone(),
            msg: e.to_string(),
        }
        .build()
    })?;

    let metadata: JarMetadata = value
        .get("metadata")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e: serde_json::Error| {
            JarMalformedSnafu {
                domain: domain.clone(),
                msg: e.to_string(),
            }
            .build()
        })?
        .unwrap_or_default();

    Ok((cookies, metadata))
}

/// Convenience for callers that only know the domain, not the path.
pub fn load_domain(domain: &str, cookie_dir: &Path) -> Result<(CookieJar, JarMetadata), CookieInjectorError> {
    load(&jar_path(cookie_dir, domain))
}

pub fn domain_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}
