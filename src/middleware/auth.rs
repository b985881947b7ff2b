use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;
use crate::policy::{Principal, Role};

/// Authenticated user context extracted from a bearer JWT. Handlers that
/// declare this extractor reject unauthenticated requests with 401.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            user_name: claims.user_name,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_from_headers(&parts.headers).map_err(ApiError::unauthorized)?;
        let claims = validate_jwt(&token).map_err(ApiError::unauthorized)?;
        Ok(AuthUser::from(claims))
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_rejected() {
        let headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert!(extract_jwt_from_headers(&headers).is_err());
    }

    #[test]
    fn empty_bearer_token_is_rejected() {
        let headers = headers_with_auth("Bearer   ");
        assert!(extract_jwt_from_headers(&headers).is_err());
    }

    #[test]
    fn bearer_token_is_extracted() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn generated_token_roundtrips_through_validation() {
        // Development config carries a usable secret.
        let claims = Claims::new(
            Uuid::new_v4(),
            "matti".to_string(),
            "matti@example.com".to_string(),
            Role::User,
        );
        let user_id = claims.sub;
        let token = crate::auth::generate_jwt(claims).unwrap();
        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.role, Role::User);
    }
}
