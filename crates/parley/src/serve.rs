// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley serve` command implementation.
//!
//! Builds the static store, the chat and speech providers, the registries and
//! the synthesis pool, then serves the gateway until SIGINT or SIGTERM. On the
//! way out the pool is drained and the registries are cleared.

use std::sync::Arc;

use axum::Router;
use parley_config::model::{ParleyConfig, TtsConfig};
use parley_core::error::ParleyError;
use parley_core::traits::{Collaborator, SpeechSynthesizer};
use parley_core::types::HealthStatus;
use parley_gateway::{GatewayState, PoolConfig, SynthesisPool};
use parley_media::StaticStore;
use parley_openai::{ChatCompletionsProvider, SpeechProvider};
use parley_registry::{Registries, TaskRegistry};
use tracing::{info, warn};

use crate::shutdown;

/// Everything `serve` owns between startup and shutdown.
struct Service {
    router: Router,
    registries: Registries,
    synthesis: Option<SynthesisPool>,
}

impl Service {
    async fn build(config: &ParleyConfig) -> Result<Self, ParleyError> {
        let store = StaticStore::new(
            &config.storage.static_dir,
            &config.storage.upload_dir,
            &config.storage.audio_dir,
            config.server.public_base_url(),
        );
        store.ensure_dirs().await.map_err(|e| ParleyError::Storage {
            source: Box::new(e),
        })?;

        let inference = ChatCompletionsProvider::new(&config.inference)?;
        report_inference_health(&inference).await;

        let registries = Registries::init();
        let synthesis =
            resolve_synthesis(&config.tts, store.clone(), Arc::clone(&registries.tasks)).await;

        let state = GatewayState::new(
            registries.clone(),
            Arc::new(inference),
            synthesis.as_ref().map(SynthesisPool::queue),
            store,
        );
        let router = parley_gateway::router(state, config.server.max_upload_bytes());

        Ok(Self {
            router,
            registries,
            synthesis,
        })
    }

    async fn shutdown(self) {
        if let Some(pool) = self.synthesis {
            let abandoned = pool.shutdown().await;
            if abandoned > 0 {
                warn!(abandoned, "synthesis jobs cancelled by shutdown");
            }
        }
        let report = self.registries.shutdown();
        info!(
            sessions = report.sessions_cleared,
            files = report.files_removed,
            tasks = report.tasks_cleared,
            "shutdown cleanup complete"
        );
    }
}

/// Runs the `parley serve` command.
pub async fn run_serve(config: ParleyConfig) -> Result<(), ParleyError> {
    init_tracing(&config.server.log_level);

    info!(
        bind = %config.server.bind_address(),
        public_url = %config.server.public_base_url(),
        static_dir = %config.storage.static_dir,
        upload_dir = %config.storage.upload_dir,
        audio_dir = %config.storage.audio_dir,
        "starting parley serve"
    );

    let service = Service::build(&config).await?;
    let listener = parley_gateway::bind(&config.server.bind_address()).await?;

    let cancel = shutdown::install_signal_handler();
    let result =
        parley_gateway::start_server(listener, service.router.clone(), cancel.cancelled_owned())
            .await;

    service.shutdown().await;
    info!("parley serve shutdown complete");
    result
}

/// Logs whether the chat model is reachable. Startup continues either way:
/// questions answered while it is down get the fallback answer.
async fn report_inference_health(inference: &ChatCompletionsProvider) {
    let provider = inference.name();
    let model = inference.model();
    match inference.health_check().await {
        Ok(HealthStatus::Healthy) => info!(provider, model, "inference provider ready"),
        Ok(HealthStatus::Degraded(reason)) => {
            warn!(provider, model, reason = %reason, "inference provider degraded")
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(provider, model, reason = %reason, "inference provider unreachable")
        }
        Err(e) => warn!(provider, model, error = %e, "inference health check failed"),
    }
}

/// Decides once, at startup, whether speech synthesis is offered.
///
/// Synthesis is available only when enabled in config and the speech
/// endpoint passes its health check.
async fn resolve_synthesis(
    config: &TtsConfig,
    store: StaticStore,
    tasks: Arc<TaskRegistry>,
) -> Option<SynthesisPool> {
    if !config.enabled {
        info!("speech synthesis disabled by configuration");
        return None;
    }

    let provider = match SpeechProvider::new(config) {
        Ok(provider) => provider,
        Err(e) => {
            warn!(error = %e, "failed to create speech provider, synthesis disabled");
            return None;
        }
    };

    info!(model = provider.model(), "checking speech provider");
    start_if_healthy(Arc::new(provider), store, tasks, pool_config(config)).await
}

fn pool_config(config: &TtsConfig) -> PoolConfig {
    PoolConfig {
        workers: config.workers,
        queue_capacity: config.queue_capacity,
    }
}

async fn start_if_healthy(
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: StaticStore,
    tasks: Arc<TaskRegistry>,
    pool: PoolConfig,
) -> Option<SynthesisPool> {
    let status = match synthesizer.health_check().await {
        Ok(status) => status,
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    };
    if !status.is_usable() {
        warn!(
            provider = synthesizer.name(),
            status = ?status,
            "speech synthesis unavailable, continuing without it"
        );
        return None;
    }
    if let HealthStatus::Degraded(reason) = &status {
        warn!(provider = synthesizer.name(), reason = %reason, "speech provider degraded");
    }

    info!(
        provider = synthesizer.name(),
        format = synthesizer.audio_format(),
        "speech synthesis enabled"
    );
    Some(SynthesisPool::start(synthesizer, store, tasks, pool))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("parley={log_level},tower_http=info,warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
