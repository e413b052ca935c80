use crate::api_state::ApiContext;
use crate::create_router;
use app_state::AppSettings;
use color_eyre::Result;
use common_services::inference_client::InferenceClient;
use common_services::storage::R2Storage;
use http::{HeaderValue, header};
use reqwest::Client;
use sqlx::PgPool;
use std::iter::once;
use tokio::net::TcpListener;
use tower_http::cors;
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub async fn serve(pool: PgPool, settings: AppSettings) -> Result<()> {
    // --- Server Startup ---
    info!("🚀 Initializing server...");
    let api_state = ApiContext {
        pool: pool.clone(),
        storage: R2Storage::new(&settings.storage),
        inference: build_inference_client(&settings),
        settings: settings.clone(),
    };

    // --- CORS Configuration ---
    let allowed_origins: Vec<HeaderValue> = settings
        .api
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", origin, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(allowed_origins)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::USER_AGENT,
            header::CACHE_CONTROL,
            header::PRAGMA,
        ]);

    // --- Create Router ---
    let app = create_router(api_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetSensitiveRequestHeadersLayer::new(once(
            header::AUTHORIZATION,
        )));

    let address = format!("{}:{}", settings.api.host, settings.api.port);
    let listener = TcpListener::bind(&address).await?;
    info!("🐸 Server listening on http://{}", address);

    axum::serve(listener, app).await?;
    Ok(())
}

/// The GPU client only exists when both halves of its configuration do.
/// Running without it is a supported state: uploads still queue jobs, and
/// the face endpoints answer 503 until the service is wired up.
fn build_inference_client(settings: &AppSettings) -> Option<InferenceClient> {
    let secrets = &settings.secrets;
    match (
        secrets.inference_url.clone(),
        secrets.face_processing_secret.clone(),
    ) {
        (Some(url), Some(secret)) => Some(InferenceClient::new(
            Client::new(),
            url,
            secret,
            &settings.face_search,
        )),
        _ => {
            warn!("⚠️ Face inference service not configured, face search runs degraded.");
            None
        }
    }
}
