use std::net::IpAddr;

use psl::{List, Psl};

use crate::error::{CookieInjectorError, UnparseableHostSnafu};

/// Map a raw hostname to its registered (eTLD+1) domain, e.g.
/// `www.nrc.nl` -> `nrc.nl`, `a.b.c.nrc.nl` -> `nrc.nl`. Hosts with no
/// registrable label under the public suffix list (`localhost`) or that
/// are raw IP literals fail with `UnparseableHost`.
///
/// `psl`'s implicit "*" rule treats any unlisted TLD as a one-label public
/// suffix, so a bare IP like `127.0.0.1` would otherwise resolve to
/// `Some("0.1")` instead of `None`. IP literals are rejected up front, and
/// the resolved suffix is additionally required to be a known PSL entry.
pub fn canonicalise(host: &str) -> Result<String, CookieInjectorError> {
    if host.parse::<IpAddr>().is_ok() {
        return UnparseableHostSnafu {
            host: host.to_string(),
        }
        .fail();
    }

    let list = List::new();
    let domain = list.domain(host.as_bytes()).ok_or_else(|| {
        UnparseableHostSnafu {
            host: host.to_string(),
        }
        .build()
    })?;

    if !domain.suffix().is_known() {
        return UnparseableHostSnafu {
            host: host.to_string(),
        }
        .fail();
    }

    let canonical = std::str::from_utf8(domain.as_bytes())
        .map_err(|_| {
            UnparseableHostSnafu {
                host: host.to_string(),
            }
            .build()
        })?
        .to_string();

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_simple_subdomain() {
        assert_eq!(canonicalise("www.nrc.nl").unwrap(), "nrc.nl");
    }

    #[test]
    fn already_canonical_is_idempotent() {
        let once = canonicalise("nrc.nl").unwrap();
        let twice = canonicalise(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, "nrc.nl");
    }

    #[test]
    fn collapses_deep_subdomain() {
        assert_eq!(canonicalise("a.b.c.nrc.nl").unwrap(), "nrc.nl");
    }

    #[test]
    fn localhost_is_unparseable() {
        assert!(canonicalise("localhost").is_err());
    }

    #[test]
    fn ip_literal_is_unparseable() {
        assert!(canonicalise("127.0.0.1").is_err());
    }

    #[test]
    fn ipv6_literal_is_unparseable() {
        assert!(canonicalise("::1").is_err());
    }

    #[test]
    fn unknown_suffix_is_unparseable() {
        assert!(canonicalise("foo.bar.unknowntld").is_err());
    }
}
