use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, time::Duration};

use crate::{Error, InternalResult, fqn::Fqn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryConfig {
    /// How often a pending `wait` re-checks its condition.
    #[serde(default = "default_poll_interval", with = "duration_ms")]
    pub poll_interval: Duration,

    /// Base path scripts are loaded from; published as `INCLUDE`.
    #[serde(default = "default_include_path")]
    pub include_path: String,

    /// Where the registry publishes itself. `null` disables it.
    #[serde(default = "default_own_namespace")]
    pub own_namespace: Option<String>,

    /// Compatibility namespace whose `create_namespace` behaves like `using`.
    #[serde(default = "default_legacy_namespace")]
    pub legacy_namespace: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            include_path: default_include_path(),
            own_namespace: default_own_namespace(),
            legacy_namespace: default_legacy_namespace(),
        }
    }
}

impl RegistryConfig {
    /// No self publication, no legacy alias: the tree starts empty.
    pub fn bare() -> Self {
        Self {
            own_namespace: None,
            legacy_namespace: None,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> InternalResult<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::Config(
                "Poll interval must be greater than 0".to_string(),
            ));
        }
        for name in [&self.own_namespace, &self.legacy_namespace]
            .into_iter()
            .flatten()
        {
            Fqn::parse(name)?;
        }
        if self.own_namespace.is_some() && self.own_namespace == self.legacy_namespace {
            return Err(Error::Config(
                "own_namespace and legacy_namespace must differ".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> InternalResult<T> {
    let file = File::open(path)
        .map_err(|e| Error::Config(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> InternalResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(30)
}

fn default_include_path() -> String {
    "/static/js/".to_string()
}

fn default_own_namespace() -> Option<String> {
    Some("Common.Namespace".to_string())
}

fn default_legacy_namespace() -> Option<String> {
    Some("Util.Namespace".to_string())
}

// Duration型のシリアライズ/デシリアライズヘルパー
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
