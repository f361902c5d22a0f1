//! HTTP API gateway for parley.
//!
//! - `GET  /health`: liveness
//! - `POST /v1/chat`: one persona chat turn
//! - `POST /v1/research/stream`: run the research pipeline, SSE progress
//!
//! Built on Axum.

pub mod api_v1;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use parley_agent::PersonaChat;
use parley_config::AppConfig;
use parley_research::ResearchManager;

/// Shared application state for the gateway.
///
/// Both entry points are immutable after startup; request state lives in
/// the handlers.
pub struct GatewayState {
    pub chat: Arc<PersonaChat>,
    pub research: ResearchManager,
}

pub type SharedState = Arc<GatewayState>;

/// Build the router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build the gateway state from config: one provider, one persona load,
/// one notification sink and one mail sink shared by every request.
pub fn state_from_config(config: &AppConfig) -> Result<SharedState, Box<dyn std::error::Error>> {
    let provider = parley_providers::build_from_config(config).primary()?;
    let notifier = parley_delivery::notifier_from_config(config);
    let mailer = parley_delivery::mailer_from_config(config);

    let chat = PersonaChat::from_config(config, provider.clone(), notifier.sink);
    let research = ResearchManager::from_config(config, provider, mailer.sink);

    Ok(Arc::new(GatewayState {
        chat: Arc::new(chat),
        research,
    }))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = state_from_config(&config)?;
    info!(persona = %state.chat.persona().name, "Persona loaded");

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use parley_core::delivery::{DeliveryPolicy, NoopNotifier};
    use parley_core::error::ProviderError;
    use parley_core::message::Message;
    use parley_core::persona::{Persona, PersonaSources};
    use parley_core::provider::{FinishReason, Provider, ProviderRequest, ProviderResponse};
    use parley_research::{
        Mailer, Planner, ReportData, ResearchError, SearchItem, SearchPlan, Searcher, Writer,
    };

    /// Answers every request with the same text.
    pub struct EchoProvider(pub String);

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            if self.0.is_empty() {
                return Err(ProviderError::Network("connection refused".into()));
            }
            Ok(ProviderResponse {
                message: Message::assistant(&self.0),
                finish_reason: FinishReason::Stop,
                usage: None,
                model: request.model,
            })
        }
    }

    struct TwoSearches;

    #[async_trait]
    impl Planner for TwoSearches {
        async fn plan(&self, _query: &str) -> Result<SearchPlan, ResearchError> {
            Ok(SearchPlan {
                searches: vec![SearchItem::new("r1", "q1"), SearchItem::new("r2", "q2")],
            })
        }
    }

    struct EchoSearcher;

    #[async_trait]
    impl Searcher for EchoSearcher {
        async fn search(&self, item: &SearchItem) -> Result<String, ResearchError> {
            Ok(format!("found {}", item.query))
        }
    }

    struct FixedWriter;

    #[async_trait]
    impl Writer for FixedWriter {
        async fn write(&self, query: &str, _results: &[String]) -> Result<ReportData, ResearchError> {
            Ok(ReportData {
                short_summary: "summary".into(),
                markdown_report: format!("# {query}"),
                follow_up_questions: vec![],
            })
        }
    }

    pub struct Mailbox {
        pub fail: bool,
    }

    #[async_trait]
    impl Mailer for Mailbox {
        async fn deliver(&self, _report: &ReportData) -> Result<(), ResearchError> {
            if self.fail {
                return Err(parley_core::error::DeliveryError::NotConfigured("mail.to".into()).into());
            }
            Ok(())
        }
    }

    pub fn state(reply: &str, mail_fails: bool) -> SharedState {
        let provider: Arc<dyn Provider> = Arc::new(EchoProvider(reply.into()));
        let persona = Persona::load(&PersonaSources {
            name: "Ada Lovelace".into(),
            system_prompt_override: Some("You are Ada Lovelace.".into()),
            ..Default::default()
        });
        let chat = PersonaChat::new(
            provider,
            "mock-model",
            persona,
            Arc::new(NoopNotifier),
            DeliveryPolicy::Absorb,
        );
        let research = ResearchManager::new(
            Arc::new(TwoSearches),
            Arc::new(EchoSearcher),
            Arc::new(FixedWriter),
            Arc::new(Mailbox { fail: mail_fails }),
        );

        Arc::new(GatewayState {
            chat: Arc::new(chat),
            research,
        })
    }
}
