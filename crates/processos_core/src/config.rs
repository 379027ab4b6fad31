//! Runtime configuration shared by the shells.
//!
//! The seed location defaults to the site-relative `/processos.json`. It only
//! becomes fetchable once an asset base (directory or `http(s)://` origin) is
//! configured; an absolute URL or an explicit path is used as-is.

use crate::source::{
    resolve_source, FetchError, FetchResult, RecordSource, UnresolvedRecordSource,
};
use crate::store::record_store::{StorePolicy, DEFAULT_SLOT_KEY};
use log::warn;
use std::path::Path;
use std::time::Duration;

/// Default fallback resource location, relative to the asset base.
pub const DEFAULT_FALLBACK_LOCATION: &str = "/processos.json";

/// Env var overriding the fallback location.
pub const ENV_FALLBACK_LOCATION: &str = "PROCESSOS_FALLBACK_URL";
/// Env var holding the directory or origin the default location resolves against.
pub const ENV_ASSET_BASE: &str = "PROCESSOS_ASSET_BASE";
/// Env var holding the fetch timeout in milliseconds.
pub const ENV_FETCH_TIMEOUT_MS: &str = "PROCESSOS_FETCH_TIMEOUT_MS";

/// Core settings. Shells fill this from env vars or CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Slot holding the serialized sequence.
    pub slot_key: String,
    /// `http(s)://` URL, filesystem path, or site-relative path of the seed resource.
    pub fallback_location: String,
    /// Directory or `http(s)://` origin that relative locations resolve against.
    pub asset_base: Option<String>,
    /// Fetch timeout. `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
    pub store_policy: StorePolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            fallback_location: DEFAULT_FALLBACK_LOCATION.to_string(),
            asset_base: None,
            fetch_timeout: None,
            store_policy: StorePolicy::default(),
        }
    }
}

impl CoreConfig {
    /// Same defaults with another fallback location.
    pub fn with_fallback(location: impl Into<String>) -> Self {
        Self {
            fallback_location: location.into(),
            ..Self::default()
        }
    }

    /// Reads `PROCESSOS_FALLBACK_URL`, `PROCESSOS_ASSET_BASE` and
    /// `PROCESSOS_FETCH_TIMEOUT_MS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from a variable lookup. Blank values count as unset and
    /// an unparseable timeout is ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut config = Self::default();
        if let Some(location) = value(ENV_FALLBACK_LOCATION) {
            config.fallback_location = location;
        }
        config.asset_base = value(ENV_ASSET_BASE);
        config.fetch_timeout = value(ENV_FETCH_TIMEOUT_MS)
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis);
        config
    }

    /// Location the fallback fetch will hit.
    ///
    /// # Errors
    /// - `InvalidLocation` for a blank location.
    /// - `MissingAssetBase` when the site-relative default has nothing to
    ///   resolve against.
    pub fn resolved_fallback(&self) -> FetchResult<String> {
        let location = self.fallback_location.trim();
        if location.is_empty() {
            return Err(FetchError::InvalidLocation(self.fallback_location.clone()));
        }
        if is_http(location) {
            return Ok(location.to_string());
        }

        match self.asset_base.as_deref().map(str::trim) {
            Some(base) if is_http(base) => Ok(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                location.trim_start_matches('/')
            )),
            Some(base) => Ok(Path::new(base)
                .join(location.trim_start_matches('/'))
                .to_string_lossy()
                .into_owned()),
            None if location == DEFAULT_FALLBACK_LOCATION => {
                Err(FetchError::MissingAssetBase(location.to_string()))
            }
            None => Ok(location.to_string()),
        }
    }

    /// Builds the record source for the resolved fallback location.
    pub fn fallback_source(&self) -> FetchResult<Box<dyn RecordSource>> {
        resolve_source(&self.resolved_fallback()?, self.fetch_timeout)
    }

    /// Like [`CoreConfig::fallback_source`], but a resolution error is held
    /// back until the source is fetched. A populated slot then loads even
    /// when no seed location is configured.
    pub fn deferred_fallback_source(&self) -> Box<dyn RecordSource> {
        match self.fallback_source() {
            Ok(source) => source,
            Err(err) => {
                warn!("event=fallback_resolve module=config status=error error={err}");
                Box::new(UnresolvedRecordSource::new(err))
            }
        }
    }
}

fn is_http(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, ENV_ASSET_BASE, ENV_FALLBACK_LOCATION, ENV_FETCH_TIMEOUT_MS};
    use crate::source::FetchError;
    use std::collections::HashMap;
    use log::warn;
use std::path::Path;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_stored_layout() {
        let config = CoreConfig::default();
        assert_eq!(config.slot_key, "processos");
        assert_eq!(config.fallback_location, "/processos.json");
        assert!(config.asset_base.is_none());
        assert!(config.fetch_timeout.is_none());
        assert!(!config.store_policy.persist_empty_snapshot);
    }

    #[test]
    fn with_fallback_keeps_other_defaults() {
        let config = CoreConfig::with_fallback("http://127.0.0.1:9/processos.json");
        assert_eq!(config.slot_key, "processos");
        assert_eq!(config.fallback_location, "http://127.0.0.1:9/processos.json");
    }

    #[test]
    fn default_location_without_asset_base_is_an_explicit_error() {
        let config = CoreConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CoreConfig::default());

        let err = config.resolved_fallback().unwrap_err();
        assert_eq!(
            err,
            FetchError::MissingAssetBase("/processos.json".to_string())
        );
        assert!(config.fallback_source().is_err());
        assert!(err.to_string().contains("PROCESSOS_ASSET_BASE"));

        let deferred = config.deferred_fallback_source();
        assert_eq!(deferred.fetch().unwrap_err(), err);
    }

    #[test]
    fn default_location_resolves_against_directory_or_origin() {
        let config = CoreConfig::from_lookup(lookup(&[(ENV_ASSET_BASE, "/srv/app/public")]));
        assert_eq!(
            config.resolved_fallback().unwrap(),
            Path::new("/srv/app/public")
                .join("processos.json")
                .to_string_lossy()
        );

        let config = CoreConfig::from_lookup(lookup(&[(ENV_ASSET_BASE, "https://app.example/")]));
        assert_eq!(
            config.resolved_fallback().unwrap(),
            "https://app.example/processos.json"
        );
    }

    #[test]
    fn absolute_url_and_explicit_path_ignore_missing_base() {
        let config = CoreConfig::with_fallback("https://cdn.example/seed.json");
        assert_eq!(
            config.resolved_fallback().unwrap(),
            "https://cdn.example/seed.json"
        );

        let config = CoreConfig::with_fallback("fixtures/processos.json");
        assert_eq!(config.resolved_fallback().unwrap(), "fixtures/processos.json");
    }

    #[test]
    fn from_lookup_reads_location_and_timeout() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_FALLBACK_LOCATION, " http://127.0.0.1:9/seed.json "),
            (ENV_FETCH_TIMEOUT_MS, "250"),
        ]));
        assert_eq!(config.fallback_location, "http://127.0.0.1:9/seed.json");
        assert_eq!(config.fetch_timeout, Some(Duration::from_millis(250)));

        let config = CoreConfig::from_lookup(lookup(&[(ENV_FETCH_TIMEOUT_MS, "soon")]));
        assert!(config.fetch_timeout.is_none());
    }
}
