use crate::api_state::ApiContext;
use crate::auth::middlewares::common::{extract_context, extract_token};
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use common_services::api::auth::error::AuthError;
use common_services::api::auth::interfaces::OrganizerClaims;
use common_services::api::auth::token::decode_organizer_token;

/// Extractor for routes only event organizers may call.
#[derive(Clone, Debug)]
pub struct ApiOrganizer(pub OrganizerClaims);

impl<S> FromRequestParts<S> for ApiOrganizer
where
    S: Send + Sync,
    State<ApiContext>: FromRequestParts<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let context = extract_context(parts, state).await?;
        let claims = decode_organizer_token(&token, &context.settings.secrets.jwt)?;
        Ok(Self(claims))
    }
}
