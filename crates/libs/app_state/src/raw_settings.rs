use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub secrets: SecretSettings,
    pub storage: StorageSettings,
    pub face_search: FaceSearchSettings,
    pub constants: RawConstants,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u32,
    pub allowed_origins: Vec<String>,
    pub public_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretSettings {
    pub jwt: String,
    pub database_url: String,
    /// Shared secret for the trigger endpoint and the inference service.
    /// Trigger requests fail with 503 while this is unset.
    pub face_processing_secret: Option<String>,
    /// Base URL of the GPU inference service.
    pub inference_url: Option<Url>,
}

/// R2 bucket access (S3-compatible API).
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub signed_url_ttl_s: u64,
}

/// Face pipeline tunables. Threshold defaults come from the proven
/// prototype values; retry spacing is a fixed base delay, not exponential.
#[derive(Debug, Deserialize, Clone)]
pub struct FaceSearchSettings {
    /// High confidence tier, also the source of prototype faces.
    pub tier1_threshold: f32,
    /// Wider net for borderline matches.
    pub tier2_threshold: f32,
    /// Matches below this never reach clients, even when tier 2 found them.
    pub display_threshold: f32,
    /// Max candidates pulled from pgvector per scan.
    pub max_candidates: i64,
    /// Max images per batch sent to the GPU service.
    pub max_batch_size: i64,
    pub max_job_attempts: i16,
    pub retry_base_delay_s: i64,
    /// Jobs stuck in `processing` longer than this are considered crashed.
    pub stuck_job_timeout_minutes: f64,
    /// Claim/dispatch rounds per trigger invocation.
    pub max_trigger_rounds: u32,
    pub dispatch_timeout_s: u64,
    pub embed_timeout_s: u64,
    pub refinement_cycles: u32,
    pub min_selfie_confidence: f32,
    pub max_selfie_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawConstants {
    pub database: DatabaseConstants,
}

/// Database connection and related configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConstants {
    pub max_connections: u32,
    pub min_connection: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
    pub acquire_timeout: u64,
}
