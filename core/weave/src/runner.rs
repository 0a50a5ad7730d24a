// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info, span, warn};

use weave_registry::{
    MEMORY_PROTOCOL, MemoryRegistryCreator, RegistryCache, RegistryCreators, RegistryFactory,
};

use crate::build_info;
use crate::config::{ConfigLoader, RegistryConfig};
use crate::runtime;
use crate::signal;

/// Registry cache backed by the creators shipped with weave.
pub fn registry_cache() -> RegistryCache {
    let creators = RegistryCreators::new();
    creators.insert(MEMORY_PROTOCOL, Arc::new(MemoryRegistryCreator));
    RegistryCache::new(Arc::new(creators))
}

fn connect(cache: &RegistryCache, registries: &[RegistryConfig]) -> Result<()> {
    for registry in registries {
        let url = registry
            .descriptor()
            .with_context(|| format!("invalid registry url {}", registry.url()))?;
        let connected = cache
            .get_registry(&url)
            .with_context(|| format!("failed to connect registry {}", url.to_identity_string()))?;
        info!(url = %connected.url().to_identity_string(), "registry connected");
    }
    Ok(())
}

/// Destroy every registry in `cache` on the blocking pool, within
/// `drain_timeout`.
async fn teardown(cache: Arc<RegistryCache>, drain_timeout: Duration) -> Result<()> {
    let teardown = tokio::task::spawn_blocking(move || cache.destroy_all());
    match tokio::time::timeout(drain_timeout, teardown).await {
        Ok(joined) => joined.context("registry teardown panicked")?,
        Err(_) => {
            warn!(timeout = ?drain_timeout, "registry teardown timed out");
            anyhow::bail!("registry teardown timed out after {:?}", drain_timeout);
        }
    }

    info!("all registries destroyed");
    Ok(())
}

/// Connect `registries`, wait for `shutdown`, then destroy every registry in
/// `cache` once, within `drain_timeout`.
///
/// If a registry fails to connect, the ones already connected are destroyed
/// before the connect error is returned.
pub async fn serve<F>(
    cache: Arc<RegistryCache>,
    registries: &[RegistryConfig],
    drain_timeout: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    if let Err(e) = connect(&cache, registries) {
        error!(error = %format!("{:#}", e), "startup failed, destroying connected registries");
        if let Err(teardown_err) = teardown(cache, drain_timeout).await {
            warn!(error = %teardown_err, "registry teardown after failed startup");
        }
        return Err(e);
    }
    info!(registries = cache.len(), "weave started");

    shutdown.await;
    debug!("received shutdown signal");

    teardown(cache, drain_timeout).await
}

/// Async body: tracing setup, registry lifecycle, graceful shutdown.
pub async fn run_registries<F>(mut config: ConfigLoader, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let tracing_conf = config.tracing().context("invalid tracing configuration")?;
    if let Err(e) = tracing_conf.setup_tracing_subscriber() {
        warn!(error = %e, "tracing subscriber not installed");
    }

    let root_span = span!(tracing::Level::INFO, "application_lifecycle");
    let _enter = root_span.enter();

    debug!(?tracing_conf);
    info!(build_info = %build_info::BUILD_INFO);

    let drain_timeout = config
        .runtime()
        .context("invalid runtime configuration")?
        .drain_timeout();
    let registries = config.registries().context("error loading registries")?;

    serve(
        Arc::new(registry_cache()),
        registries,
        drain_timeout,
        shutdown,
    )
    .await
}

/// Load config from `config_file`, build a Tokio runtime as specified by the
/// `runtime:` section, connect the registries and block until a shutdown
/// signal is received.
pub fn run(config_file: &str) -> Result<()> {
    let mut config = ConfigLoader::new(config_file).context("failed to load configuration")?;

    let weave_runtime = runtime::build(config.runtime().context("invalid runtime configuration")?)
        .context("failed to build runtime")?;
    weave_runtime
        .runtime
        .block_on(run_registries(config, signal::shutdown()))
}
