use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use cookie_injector::alerting::Alerter;
use cookie_injector::config::load_config;
use cookie_injector::error::CookieInjectorError;
use cookie_injector::health;
use cookie_injector::login::LoginRegistry;
use cookie_injector::refresh::BrowserLauncher;
use cookie_injector::site_loop;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const REFRESH_CONCURRENCY: usize = 3;
const DEFAULT_HEALTH_PORT: u16 = 8081;

#[derive(Parser, Debug)]
#[command(name = "cookie-injector", about = "Adaptive cookie refresh and injection control plane")]
struct Cli {
    /// Path to the site configuration YAML. Overrides CONFIG_PATH.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory jar files are read from and written to. Overrides COOKIE_DIR.
    #[arg(long)]
    cookie_dir: Option<PathBuf>,

    /// Port the health aggregator listens on. Overrides HEALTH_PORT.
    #[arg(long)]
    health_port: Option<u16>,
}

/// Placeholder for the external headless-browser driver. Launching a real
/// browser context is out of scope for this crate (see Non-goals); every
/// attempt here fails immediately so a deployment without a wired-in
/// driver degrades to `RefreshFailed` rather than hanging.
struct UnimplementedBrowserLauncher;

#[async_trait]
impl BrowserLauncher for UnimplementedBrowserLauncher {
    async fn launch(
        &self,
        domain: &str,
    ) -> Result<Box<dyn cookie_injector::login::nrc::BrowserPage>, CookieInjectorError> {
        cookie_injector::error::BrowserErrorSnafu {
            domain: domain.to_string(),
            msg: "no browser driver wired into this deployment".to_string(),
        }
        .fail()
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("default log filter is always valid");

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "config_load_failed");
            std::process::exit(1);
        }
    };

    let cookie_dir = cli.cookie_dir.unwrap_or(config.cookie_dir);
    let health_port = cli
        .health_port
        .or_else(|| std::env::var("HEALTH_PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(DEFAULT_HEALTH_PORT);

    let gate = Arc::new(Semaphore::new(REFRESH_CONCURRENCY));
    let registry = Arc::new(LoginRegistry::new());
    let launcher: Arc<dyn BrowserLauncher> = Arc::new(UnimplementedBrowserLauncher);
    let alerter = Arc::new(Alerter::new(config.ntfy_url.clone(), config.healthcheck_url.clone()));

    let mut tasks = JoinSet::new();

    for site in config.sites {
        let cookie_dir = cookie_dir.clone();
        let gate = gate.clone();
        let registry = registry.clone();
        let launcher = launcher.clone();
        let alerter = alerter.clone();
        tasks.spawn(async move {
            site_loop::run(site, cookie_dir, gate, registry, launcher, alerter).await;
        });
    }

    tasks.spawn(async move {
        if let Err(e) = health::server::run(cookie_dir, health_port).await {
            tracing::error!(error = %e, "health_server_failed");
        }
    });

    match tasks.join_next().await {
        Some(Ok(())) => {
            tracing::error!("a supervised task returned unexpectedly, treating as fatal");
        }
        Some(Err(e)) => {
            tracing::error!(error = %e, "a supervised task panicked, treating as fatal");
        }
        None => {
            tracing::error!("no sites configured to run");
        }
    }

    std::process::exit(1);
}
