use crate::api::auth::error::AuthError;
use crate::api::auth::interfaces::{GalleryClaims, OrganizerClaims};
use jsonwebtoken::{DecodingKey, Validation, decode};

pub fn decode_organizer_token(token: &str, jwt_secret: &str) -> Result<OrganizerClaims, AuthError> {
    decode::<OrganizerClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

pub fn decode_gallery_token(token: &str, jwt_secret: &str) -> Result<GalleryClaims, AuthError> {
    decode::<GalleryClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    fn make_token(claims: &impl serde::Serialize, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .expect("encodable claims")
    }

    #[test]
    fn round_trips_organizer_claims() {
        let claims = OrganizerClaims {
            sub: Uuid::new_v4(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        let token = make_token(&claims, "secret");
        let decoded = decode_organizer_token(&token, "secret").expect("valid token");
        assert_eq!(decoded.sub, claims.sub);
    }

    #[test]
    fn rejects_wrong_secret() {
        let claims = GalleryClaims {
            sub: "auth-123".to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        let token = make_token(&claims, "secret");
        assert!(decode_gallery_token(&token, "other").is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let claims = GalleryClaims {
            sub: "auth-123".to_string(),
            exp: chrono::Utc::now().timestamp() - 3600,
        };
        let token = make_token(&claims, "secret");
        assert!(decode_gallery_token(&token, "secret").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_gallery_token("not-a-jwt", "secret").is_err());
    }
}
