/// HTTP middleware utilities for posts-service
///
/// Identity is resolved once per request by `IdentityMiddleware` and read by
/// the `Viewer` and `AuthenticatedUser` extractors. Anonymous requests are
/// never rejected here; routes that need a user ask for `AuthenticatedUser`,
/// which redirects to the login page.
pub mod auth;
pub mod permissions;

pub use auth::{Claims, Identity, JwtKeys};

use crate::config::DEFAULT_LOGIN_URL;
use crate::db::Store;
use crate::error::AppError;
use crate::AppState;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

// =====================================================================
// Identity resolution
// =====================================================================

/// Actix middleware that turns a valid Bearer token into an `Identity`.
#[derive(Clone)]
pub struct IdentityMiddleware {
    keys: Arc<JwtKeys>,
}

impl IdentityMiddleware {
    pub fn new(keys: Arc<JwtKeys>) -> Self {
        Self { keys }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct IdentityMiddlewareService<S> {
    service: Rc<S>,
    keys: Arc<JwtKeys>,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddlewareService<S>
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
        let service = self.service.clone();

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);

        if let Some(token) = token {
            match self.keys.verify(&token) {
                Ok(identity) => {
                    req.extensions_mut().insert(identity);
                }
                Err(err) => {
                    tracing::warn!(path = %req.path(), error = %err, "ignoring invalid bearer token");
                }
            }
        }

        Box::pin(async move { service.call(req).await })
    }
}

// =====================================================================
// Extractors
// =====================================================================

/// The identity of the request, if any.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Identity>);

impl Viewer {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl FromRequest for Viewer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(Viewer(req.extensions().get::<Identity>().cloned())))
    }
}

/// The identity of a request to a login-only route. Anonymous requests, and
/// tokens whose subject is not a known user, are redirected to the login page
/// with `next` pointing back here.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let identity = req.extensions().get::<Identity>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        let login_url = state
            .as_ref()
            .map(|state| state.settings.login_url.clone())
            .unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string());
        let next = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.path().to_string());

        Box::pin(async move {
            if let (Some(identity), Some(state)) = (identity, state) {
                match state.store.find_user(identity.user_id).await? {
                    Some(user) => {
                        return Ok(AuthenticatedUser(Identity {
                            user_id: user.id,
                            username: user.username,
                        }))
                    }
                    None => tracing::warn!(
                        user_id = identity.user_id,
                        username = %identity.username,
                        "token subject is not a known user"
                    ),
                }
            }

            Err(AppError::login_required(&login_url, &next))
        })
    }
}
