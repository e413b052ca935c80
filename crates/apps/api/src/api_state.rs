use app_state::AppSettings;
use axum::extract::FromRef;
use common_services::inference_client::InferenceClient;
use common_services::storage::R2Storage;
use sqlx::PgPool;

#[derive(Clone)]
pub struct ApiContext {
    pub pool: PgPool,
    pub settings: AppSettings,
    pub storage: R2Storage,
    /// `None` until both the inference URL and the shared secret are
    /// configured; the endpoints that need it answer 503 in that state.
    pub inference: Option<InferenceClient>,
}

// These impls allow Axum to extract parts of the state directly, which keeps
// middleware and extractors from depending on the whole context.
impl FromRef<ApiContext> for PgPool {
    fn from_ref(state: &ApiContext) -> Self {
        state.pool.clone()
    }
}

impl FromRef<ApiContext> for AppSettings {
    fn from_ref(state: &ApiContext) -> Self {
        state.settings.clone()
    }
}
