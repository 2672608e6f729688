use nsregistry::{Registry, config::RegistryConfig};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    // tracing_subscriberの初期化
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Registry with an empty tree.
#[allow(dead_code)]
pub fn bare_registry() -> Registry {
    Registry::new(RegistryConfig::bare()).expect("bare config is valid")
}

/// Registry with an empty tree and a short poll interval.
#[allow(dead_code)]
pub fn polling_registry(poll_interval: Duration) -> Registry {
    Registry::new(RegistryConfig {
        poll_interval,
        ..RegistryConfig::bare()
    })
    .expect("poll interval is non-zero")
}
