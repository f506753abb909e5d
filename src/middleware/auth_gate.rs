/// Bearer-Token Request Guard
///
/// Extracts the bearer token from the Authorization header, verifies it,
/// and attaches the caller's identity to the request extensions. Two
/// modes share the one extraction/verification routine: `required`
/// rejects requests without a valid token, `optional` lets them through
/// with no attached identity so downstream handlers can branch on
/// presence.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::TokenCodec;
use crate::error::AuthError;

/// Identity attached to a request that passed verification.
/// Handlers receive it through `web::ReqData<AuthenticatedUser>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

pub struct AuthGate {
    codec: TokenCodec,
    required: bool,
}

impl AuthGate {
    /// Guard that rejects requests without a valid access token.
    pub fn required(codec: TokenCodec) -> Self {
        Self {
            codec,
            required: true,
        }
    }

    /// Guard that verifies a token when present but never rejects.
    pub fn optional(codec: TokenCodec) -> Self {
        Self {
            codec,
            required: false,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGateService {
            service: Rc::new(service),
            codec: self.codec.clone(),
            required: self.required,
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    codec: TokenCodec,
    required: bool,
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let identity = bearer_token(&req).map(|token| {
            self.codec.verify_access(&token).and_then(|claims| {
                Ok(AuthenticatedUser {
                    id: claims.user_id()?,
                    email: claims.email,
                })
            })
        });

        match identity {
            None if self.required => {
                tracing::warn!("Missing bearer token on protected route");
                Box::pin(async move { Err(AuthError::MissingToken.into()) })
            }
            Some(Err(e)) if self.required => {
                Box::pin(async move { Err(e.into()) })
            }
            verified => {
                if let Some(Ok(user)) = verified {
                    tracing::debug!(user_id = %user.id, "Bearer token verified");
                    req.extensions_mut().insert(user);
                }

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
        }
    }
}
