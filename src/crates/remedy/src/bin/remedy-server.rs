//! remedy server binary
//!
//! Serves `POST /predict` backed by the configured generation back end,
//! knowledge base and browsing agent.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use browser_agent::HttpBrowserAgent;
use clap::Parser;
use llm::{load_local, ModelHandle};
use remedy::api::{create_router, AppState};
use remedy::{EscalationPolicy, RemedyConfig, Resolver};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "remedy-server", version, about = "Treatment recommendation server")]
struct Args {
    /// Path to remedy.toml
    #[arg(short, long, env = "REMEDY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the escalation policy
    #[arg(long, value_enum)]
    escalation: Option<PolicyArg>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum PolicyArg {
    Disabled,
    OnReject,
    Always,
}

impl From<PolicyArg> for EscalationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Disabled => EscalationPolicy::Disabled,
            PolicyArg::OnReject => EscalationPolicy::OnReject,
            PolicyArg::Always => EscalationPolicy::Always,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    tracing::info!("Loading configuration...");
    let mut config = RemedyConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    config.apply_env()?;
    if let Some(policy) = args.escalation {
        config.pipeline.escalation = policy.into();
    }

    tracing::info!(
        backend = ?config.generation.service.backend,
        model = %config.generation.service.model,
        escalation = config.pipeline.escalation.label(),
        "Configuration loaded"
    );

    // A failed load is permanent; requests are then answered from fallbacks.
    let model = ModelHandle::new();
    let state = model
        .initialize(|| load_local(&config.generation.service))
        .await;
    tracing::info!(model = state.label(), "Model state");

    let knowledge = config.knowledge_base();
    tracing::info!(entries = knowledge.len(), "Knowledge base ready");

    let mut resolver = Resolver::new(model, knowledge)
        .with_generation(config.generation.sampling.clone())
        .with_policy(config.pipeline.escalation);

    if config.pipeline.escalation != EscalationPolicy::Disabled {
        let agent = HttpBrowserAgent::new(&config.agent)
            .context("Failed to create browsing agent client")?;
        tracing::info!(
            endpoint = %config.agent.endpoint,
            domain = %config.agent.trusted_domain,
            "Browsing agent configured"
        );
        resolver = resolver.with_agent(Arc::new(agent), config.agent.clone());
    }

    let app = create_router(AppState::new(resolver));
    let addr = config.socket_addr()?;

    tracing::info!("Starting remedy server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("remedy server shut down gracefully");
    Ok(())
}

/// Signal for graceful shutdown (Ctrl-C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL-C signal, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down");
        }
    }
}
