use std::time::Duration;

/// Best-effort outbound notifications. Every call swallows its own errors
/// into a log line; a notification failure must never take down a site
/// loop (C6 continues regardless of whether the operator was told).
pub struct Alerter {
    client: reqwest::Client,
    ntfy_url: Option<String>,
    healthcheck_url: Option<String>,
}

impl Alerter {
    pub fn new(ntfy_url: Option<String>, healthcheck_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client with a fixed timeout should always build");
        Self {
            client,
            ntfy_url,
            healthcheck_url,
        }
    }

    /// POST a refresh-failure alert to the configured ntfy topic, with the
    /// `Title`/`Priority`/`Tags` headers ntfy uses to render push
    /// notifications. No-op if unconfigured.
    pub async fn notify(&self, domain: &str, error: &str) {
        let Some(url) = &self.ntfy_url else {
            tracing::debug!("ntfy_not_configured_skipping_notify");
            return;
        };

        let body = format!("Cookie refresh FAILED for {domain}: {error}");
        let result = self
            .client
            .post(url)
            .header("Title", format!("cookie-injector: {domain} failed"))
            .header("Priority", "high")
            .header("Tags", "warning,cookie-injector")
            .body(body)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(domain, "ntfy_notify_sent");
            }
            Ok(resp) => {
                tracing::warn!(domain, status = %resp.status(), "ntfy_notify_non_success");
            }
            Err(e) => {
                tracing::warn!(domain, error = %e, "ntfy_notify_failed");
            }
        }
    }

    /// Ping a healthchecks.io-style liveness endpoint: the bare URL on
    /// success, `{url}/fail` on failure. No-op if unconfigured.
    pub async fn liveness_ping(&self, success: bool) {
        let Some(base) = &self.healthcheck_url else {
            tracing::debug!("healthcheck_not_configured_skipping_ping");
            return;
        };

        let url = if success {
            base.clone()
        } else {
            format!("{base}/fail")
        };

        if let Err(e) = self.client.get(&url).send().await {
            tracing::warn!(error = %e, "healthcheck_ping_failed");
        }
    }
}
