use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::Error;

const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);
const DEFAULT_CREDENTIALS_PATH: &str = "park-console-credentials.json";

/// Console configuration.
///
/// Use [`from_env()`](ConsoleConfig::from_env) for convention-based setup,
/// or [`new()`](ConsoleConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    api_base_url: Url,
    request_timeout: Duration,
    credentials_path: PathBuf,
    refresh_profile_on_start: bool,
}

impl ConsoleConfig {
    /// Create config for the API at `api_base_url`.
    ///
    /// A missing trailing `/` is added so relative endpoint paths join
    /// underneath the base rather than replacing its last segment.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url: with_trailing_slash(api_base_url),
            request_timeout: DEFAULT_TIMEOUT,
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            refresh_profile_on_start: false,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `PARK_API_URL`: API base URL (default `http://localhost:8000/api/`)
    /// - `PARK_API_TIMEOUT_MS`: request timeout in milliseconds (default 15000)
    /// - `PARK_CREDENTIALS_PATH`: where the session record is persisted
    /// - `PARK_REFRESH_PROFILE`: `"1"` or `"true"` to refresh the profile on start
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let api_base_url: Url = lookup("PARK_API_URL")
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .parse()
            .map_err(|e| Error::Config(format!("PARK_API_URL: {e}")))?;

        let mut config = Self::new(api_base_url);

        if let Some(ms) = lookup("PARK_API_TIMEOUT_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("PARK_API_TIMEOUT_MS: {e}")))?;
            if ms == 0 {
                return Err(Error::Config("PARK_API_TIMEOUT_MS must be positive".into()));
            }
            config = config.with_request_timeout(Duration::from_millis(ms));
        }
        if let Some(path) = lookup("PARK_CREDENTIALS_PATH") {
            config = config.with_credentials_path(path);
        }

        let refresh = matches!(
            lookup("PARK_REFRESH_PROFILE").as_deref(),
            Some("1") | Some("true"),
        );
        Ok(config.with_refresh_profile_on_start(refresh))
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    #[must_use]
    pub fn with_refresh_profile_on_start(mut self, refresh: bool) -> Self {
        self.refresh_profile_on_start = refresh;
        self
    }

    #[must_use]
    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[must_use]
    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Whether [`Console::start`](crate::Console::start) re-fetches the
    /// profile of a restored session.
    #[must_use]
    pub fn refresh_profile_on_start(&self) -> bool {
        self.refresh_profile_on_start
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL.parse().expect("valid default URL"))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
