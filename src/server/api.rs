use crate::config::RelaySettings;
use crate::error::RelayError;
use crate::llm::{ GenerationClient, GenerationRequest };
use crate::models::chat::{ ChatReply, ChatRequest };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    body::Bytes,
    routing::post,
    Router,
    extract::State,
    Json,
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ debug, info };

pub const CHAT_ROUTE: &str = "/api/chat";

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn GenerationClient>,
    pub settings: Arc<RelaySettings>,
}

impl AppState {
    pub fn new(client: Arc<dyn GenerationClient>, settings: RelaySettings) -> Self {
        Self { client, settings: Arc::new(settings) }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(CHAT_ROUTE, post(chat_handler).fallback(method_not_allowed))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    app: Router,
    tls: Option<(String, String)>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match tls {
        Some((cert_path, key_path)) => {
            // axum-server may pull in aws-lc-rs as well, so the process provider must be chosen explicitly.
            let _ = rustls::crypto::ring::default_provider().install_default();
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                cert_path,
                key_path
            ).await?;

            info!("HTTPS server listening on: https://{}{}", addr, CHAT_ROUTE);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await
                .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;

            info!("HTTP server listening on: http://{}{}", addr, CHAT_ROUTE);
            axum::serve(listener, app.into_make_service()).await?;
        }
    }
    Ok(())
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatReply>, RelayError> {
    let contents = ChatRequest::from_slice(&body)
        .and_then(ChatRequest::into_conversation)
        .ok_or(RelayError::InvalidInput)?;
    debug!("Relaying conversation with {} message(s)", contents.len());

    let generation = GenerationRequest {
        contents,
        system_instruction: state.settings.persona.clone(),
        model: state.settings.model.clone(),
        temperature: state.settings.temperature,
    };
    let content = state.client.generate(&generation).await?;

    Ok(Json(ChatReply::assistant(content)))
}

async fn method_not_allowed() -> RelayError {
    RelayError::UnsupportedMethod
}
