use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims of an event organizer session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerClaims {
    /// Organizer id.
    pub sub: Uuid,
    pub exp: i64,
}

/// JWT claims of an anonymous gallery visitor session. `sub` is the auth id
/// that `gallery_users.auth_id` points at, not a row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryClaims {
    pub sub: String,
    pub exp: i64,
}
