pub mod nrc;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::SiteConfig;
use crate::cookie::CookieJar;
use crate::error::CookieInjectorError;
use nrc::BrowserPage;

/// A site-specific login routine. Implementations drive a headless
/// browser page (or equivalent) through a login flow and return the
/// resulting cookies. The page itself is supplied by the refresh executor
/// (C5), which owns the concrete browser driver; the core never talks to
/// the browser directly.
#[async_trait]
pub trait LoginRoutine: Send + Sync {
    async fn login(
        &self,
        config: &SiteConfig,
        page: &mut dyn BrowserPage,
    ) -> Result<CookieJar, CookieInjectorError>;
}

/// Static registry of known login routines, keyed by canonical domain.
/// Dynamic per-domain resolution (as the original Python implementation
/// does via `importlib`) is replaced with a small, explicit table built
/// once at startup; a lookup miss is `NoLoginScript`.
pub struct LoginRegistry {
    routines: HashMap<&'static str, Box<dyn LoginRoutine>>,
}

impl LoginRegistry {
    pub fn new() -> Self {
        let mut routines: HashMap<&'static str, Box<dyn LoginRoutine>> = HashMap::new();
        routines.insert("nrc.nl", Box::new(nrc::NrcLogin));
        Self { routines }
    }

    pub fn get(&self, domain: &str) -> Option<&dyn LoginRoutine> {
        self.routines.get(domain).map(|b| b.as_ref())
    }
}

impl Default for LoginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
