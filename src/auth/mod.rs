//! Token validation and caller resolution.
//!
//! The identity platform issues bearer JWTs; this module validates them and
//! resolves the caller's role from their stored profile. Authority is always
//! the profile's `role` attribute, never a hardcoded identity.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::{self, Next},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::models::{Role, UserProfile};
use crate::store::{self, keys, RecordStore};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id as issued by the identity platform.
    pub sub: String,
    pub iss: String,
    pub iat: usize,
    pub exp: usize,
}

/// The resolved caller, inserted into request extensions by
/// [`auth_middleware`] and pulled out by handlers as an extractor.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub struct AuthService {
    jwt_secret: String,
    issuer: String,
    store: Arc<dyn RecordStore>,
}

impl AuthService {
    pub fn new(config: &AppConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            issuer: config.auth_issuer.clone(),
            store,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| ServiceError::Unauthorized(format!("Invalid token: {}", e)))
    }

    /// Validates the token and loads the caller's profile for their role.
    pub async fn resolve_caller(&self, token: &str) -> Result<AuthUser, ServiceError> {
        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Malformed subject claim".into()))?;

        let profile: UserProfile = store::get_typed(self.store.as_ref(), &keys::user(user_id))
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Unknown user".into()))?;

        Ok(AuthUser {
            user_id,
            role: profile.role,
            email: profile.email,
        })
    }

    /// Mints a token the way the identity platform would. Used by local
    /// tooling and the integration tests.
    pub fn issue_token(&self, user_id: Uuid, ttl: Duration) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp() as usize,
            exp: (now + ttl).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("Token encoding failed: {}", e)))
    }
}

/// Resolves the bearer token and stashes the caller in request extensions.
pub async fn auth_middleware(
    State(auth): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("Missing bearer token".into()))?;

    let user = auth.resolve_caller(token).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

async fn require_role(required: Role, req: Request, next: Next) -> Result<Response, ServiceError> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ServiceError::Unauthorized("Missing authentication".into()))?;

    // admins may do anything a lesser role can
    if user.role != required && user.role != Role::Admin {
        warn!(user_id = %user.user_id, role = %user.role, required = %required, "role check failed");
        return Err(ServiceError::Forbidden(format!(
            "This action requires the {} role",
            required
        )));
    }
    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized("Missing authentication".into()))
    }
}

/// Router sugar for attaching authentication and role gates.
pub trait AuthRouterExt {
    fn with_auth(self, auth: Arc<AuthService>) -> Self;
    fn with_role(self, auth: Arc<AuthService>, role: Role) -> Self;
}

impl<S> AuthRouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self, auth: Arc<AuthService>) -> Self {
        self.route_layer(middleware::from_fn_with_state(auth, auth_middleware))
    }

    fn with_role(self, auth: Arc<AuthService>, role: Role) -> Self {
        // role check sits inside the auth layer so AuthUser is present
        self.route_layer(middleware::from_fn(move |req: Request, next: Next| {
            require_role(role, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(auth, auth_middleware))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn test_config() -> AppConfig {
        AppConfig {
            jwt_secret: "test-secret".into(),
            auth_issuer: "adeylink".into(),
            ..AppConfig::default()
        }
    }

    async fn seeded_auth(role: Role) -> (AuthService, Uuid) {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let auth = AuthService::new(&test_config(), Arc::clone(&store));
        let user_id = Uuid::new_v4();
        let profile = UserProfile {
            id: user_id,
            email: "someone@example.com".into(),
            name: "Someone".into(),
            phone: String::new(),
            bio: String::new(),
            location: Default::default(),
            role,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&profile).unwrap();
        store.set(&keys::user(user_id), value).await.unwrap();
        (auth, user_id)
    }

    #[tokio::test]
    async fn round_trip_token_resolves_role() {
        let (auth, user_id) = seeded_auth(Role::Admin).await;
        let token = auth.issue_token(user_id, Duration::hours(1)).unwrap();
        let caller = auth.resolve_caller(&token).await.unwrap();
        assert_eq!(caller.user_id, user_id);
        assert!(caller.is_admin());
    }

    #[tokio::test]
    async fn token_without_profile_is_rejected() {
        let (auth, _) = seeded_auth(Role::Buyer).await;
        let stranger = Uuid::new_v4();
        let token = auth.issue_token(stranger, Duration::hours(1)).unwrap();
        let err = auth.resolve_caller(&token).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (auth, _) = seeded_auth(Role::Buyer).await;
        assert!(auth.resolve_caller("not-a-jwt").await.is_err());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let (auth, user_id) = seeded_auth(Role::Buyer).await;
        let token = auth.issue_token(user_id, Duration::seconds(-120)).unwrap();
        assert!(auth.validate_token(&token).is_err());
    }
}
