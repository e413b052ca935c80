use crate::{
    ApiSettings, FaceSearchSettings, LoggingSettings, RawSettings, SecretSettings, StorageSettings,
};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub secrets: SecretSettings,
    pub storage: StorageSettings,
    pub face_search: FaceSearchSettings,
}

impl From<RawSettings> for AppSettings {
    fn from(raw: RawSettings) -> Self {
        Self {
            logging: raw.logging,
            api: raw.api,
            secrets: raw.secrets,
            storage: raw.storage,
            face_search: raw.face_search,
        }
    }
}

impl StorageSettings {
    /// S3-compatible endpoint of the R2 account.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("https://{}.r2.cloudflarestorage.com", self.account_id)
    }
}
