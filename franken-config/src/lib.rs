//! Loader for harvester configuration with YAML + environment overlays.
//!
//! Precedence is file first, then `FRANKEN_`-prefixed environment variables,
//! then falling back to the defaults baked into [`FrankenConfig`]. String
//! values may reference `${VAR}` placeholders, which are expanded (to a
//! bounded depth) after all sources are merged.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Runtime settings for the snippet harvester.
///
/// Every field has a default so the binary runs with no config file at all;
/// a YAML file and `FRANKEN_*` environment variables override per field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrankenConfig {
    /// Origin the documentation catalog and component pages are fetched from.
    pub base_url: String,
    /// WebDriver endpoint the browser session connects to.
    pub webdriver_url: String,
    /// Directory the harvested `html/<component>/` tree is written into.
    pub output_dir: String,
    /// Drive the browser without a visible window.
    pub headless: bool,
    /// Lower the log filter to `debug`.
    pub debug: bool,
    /// Minimum spacing between consecutive grants of the browser, measured
    /// from the previous release.
    pub rate_limit_wait_ms: u64,
    /// Pause after navigation before the page is inspected, letting
    /// client-side rendering settle.
    pub settle_delay_ms: u64,
    /// Upper bound on waiting for a selector to appear in the page.
    pub wait_timeout_ms: u64,
}

impl Default for FrankenConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.franken-ui.dev".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            output_dir: "out".to_string(),
            headless: true,
            debug: false,
            rate_limit_wait_ms: 1_000,
            settle_delay_ms: 500,
            wait_timeout_ms: 30_000,
        }
    }
}

impl FrankenConfig {
    pub fn rate_limit_wait(&self) -> Duration {
        Duration::from_millis(self.rate_limit_wait_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct FrankenConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for FrankenConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrankenConfigLoader {
    /// Start with no sources attached.
    ///
    /// Files are added with [`Self::with_file`]; the `FRANKEN_` environment
    /// overlay is layered on top of them by [`Self::load`].
    ///
    /// ```
    /// use franken_config::FrankenConfigLoader;
    ///
    /// let config = FrankenConfigLoader::new()
    ///     .with_yaml_str("headless: false\nsettle_delay_ms: 250")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert!(!config.headless);
    /// assert_eq!(config.settle_delay_ms, 250);
    /// assert_eq!(config.base_url, "https://www.franken-ui.dev");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a config file; the `config` crate infers the format by suffix.
    ///
    /// The file must exist. Callers that want a purely environment-driven
    /// run simply never attach one.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet, mostly for tests and doctests.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// The `FRANKEN_` environment overlay is merged in here, after every
    /// attached file, so an environment variable beats the file setting the
    /// same key. `${VAR}` placeholders inside string values are expanded
    /// before the typed struct is materialised, so secrets and host names
    /// can live in the environment while the file stays checked in.
    ///
    /// ```
    /// use franken_config::FrankenConfigLoader;
    ///
    /// unsafe { std::env::set_var("CHROMEDRIVER_URL", "http://127.0.0.1:4444"); }
    ///
    /// let config = FrankenConfigLoader::new()
    ///     .with_yaml_str("webdriver_url: \"${CHROMEDRIVER_URL}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.webdriver_url, "http://127.0.0.1:4444");
    ///
    /// unsafe { std::env::remove_var("CHROMEDRIVER_URL"); }
    /// ```
    pub fn load(self) -> Result<FrankenConfig, ConfigError> {
        // Later sources win, so the environment must be attached after the
        // files. `separator` would otherwise double as the prefix separator,
        // turning the expected `FRANKEN_HEADLESS` into `FRANKEN__HEADLESS`.
        let env = Environment::with_prefix("FRANKEN")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        let cfg = self.builder.add_source(env).build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: FrankenConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_nested_values() {
        temp_env::with_var("HOST", Some("docs.local"), || {
            let mut v = json!({ "base_url": "https://${HOST}", "tags": ["a-${HOST}"] });
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!({ "base_url": "https://docs.local", "tags": ["a-docs.local"] })
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_reference_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // Terminates because of the depth cap; the unresolved
            // placeholder stays in the string.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn duration_accessors_reflect_millis() {
        let cfg = FrankenConfig {
            rate_limit_wait_ms: 1_500,
            settle_delay_ms: 200,
            wait_timeout_ms: 9_000,
            ..FrankenConfig::default()
        };
        assert_eq!(cfg.rate_limit_wait(), Duration::from_millis(1_500));
        assert_eq!(cfg.settle_delay(), Duration::from_millis(200));
        assert_eq!(cfg.wait_timeout(), Duration::from_secs(9));
    }
}
