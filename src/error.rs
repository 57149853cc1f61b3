use snafu::{Location, Snafu};

/// The error taxonomy for the whole crate.
///
/// Each component recovers at its own boundary where a fallback exists
/// (pass-through, retry, alert-and-continue); anything else surfaces up
/// to `main` and is treated as fatal.
#[derive(Debug, Snafu)]
pub enum CookieInjectorError {
    #[snafu(display("cannot extract a registered domain from host '{host}'"))]
    UnparseableHost {
        host: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("cookie jar for '{domain}' does not exist"))]
    JarMissing {
        domain: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("cookie jar for '{domain}' is malformed: {msg}"))]
    JarMalformed {
        domain: String,
        msg: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("all cookies for '{domain}' have expired"))]
    JarExpired {
        domain: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("no login routine registered for '{domain}'"))]
    NoLoginScript {
        domain: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("login failed for '{domain}': {msg}"))]
    LoginFailed {
        domain: String,
        msg: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("missing credential env var '{env_var}' for '{domain}'"))]
    MissingCredentials {
        domain: String,
        env_var: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("browser error for '{domain}': {msg}"))]
    BrowserError {
        domain: String,
        msg: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("login for '{domain}' did not complete within the time budget"))]
    LoginTimedOut {
        domain: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("all refresh attempts failed for '{domain}': {last_error}"))]
    RefreshFailed {
        domain: String,
        last_error: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("alerting sink failed: {msg}"))]
    AlertingFailed {
        msg: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("invalid configuration: {msg}"))]
    ConfigInvalid {
        msg: String,
        #[snafu(implicit)]
        loc: Location,
    },

    #[snafu(display("cookie store I/O error for '{domain}': {source}"))]
    StoreIo {
        domain: String,
        source: std::io::Error,
        #[snafu(implicit)]
        loc: Location,
    },
}

pub type Result<T, E = CookieInjectorError> = std::result::Result<T, E>;
