use async_trait::async_trait;

use super::LoginRoutine;
use crate::config::SiteConfig;
use crate::cookie::CookieJar;
use crate::error::{CookieInjectorError, MissingCredentialsSnafu};

/// Seam to the external headless-browser driver (navigation, form input,
/// cookie extraction). The refresh executor owns the concrete
/// implementation; login routines only see this trait.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn goto(&mut self, url: &str) -> Result<(), CookieInjectorError>;
    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), CookieInjectorError>;
    async fn click(&mut self, selector: &str) -> Result<(), CookieInjectorError>;
    async fn wait_for_url(&mut self, pattern: &str) -> Result<(), CookieInjectorError>;
    async fn cookies(&self) -> Result<CookieJar, CookieInjectorError>;
}

/// Login routine for nrc.nl, ported from the original implementation's
/// `refresh/scripts/nrc.py`.
pub struct NrcLogin;

#[async_trait]
impl LoginRoutine for NrcLogin {
    async fn login(
        &self,
        config: &SiteConfig,
        page: &mut dyn BrowserPage,
    ) -> Result<CookieJar, CookieInjectorError> {
        let username_env = config
            .auth
            .username_env
            .clone()
            .unwrap_or_else(|| "NRC_USER".to_string());
        let password_env = config
            .auth
            .password_env
            .clone()
            .unwrap_or_else(|| "NRC_PASS".to_string());

        let username = std::env::var(&username_env).map_err(|_| {
            MissingCredentialsSnafu {
                domain: config.domain.clone(),
                env_var: username_env.clone(),
            }
            .build()
        })?;
        let password = std::env::var(&password_env).map_err(|_| {
            MissingCredentialsSnafu {
                domain: config.domain.clone(),
                env_var: password_env.clone(),
            }
            .build()
        })?;

        tracing::info!(domain = %config.domain, url = %config.login_url, "login_starting");

        page.goto(config.login_url.as_str()).await?;
        page.fill("input[name=\"username\"]", &username).await?;
        page.fill("input[name=\"password\"]", &password).await?;
        page.click("button[type=\"submit\"]").await?;
        page.wait_for_url("**/home**").await?;

        tracing::info!(domain = %config.domain, "login_succeeded");
        page.cookies().await
    }
}
