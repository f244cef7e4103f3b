//! The basic-auth gate.
//!
//! Orchestrates extraction → resolution → verification → session binding.
//! Header extraction runs first; when the API is configured for body
//! extraction, its failure falls back to the body patterns — buffering
//! the body once and restoring it for downstream handlers. Any failure
//! goes through the shared error handler, which renders the negotiated
//! error body and records the outcome.
//!
//! Identity-miss and password-miss produce byte-identical responses so
//! the gateway cannot be used to enumerate users.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header, request::Parts};
use axum::middleware::Next;
use axum::response::Response;

use tollgate_auth::{
    AuthError, BodyExtractorPatterns, PasswordVerifier, SessionResolver, credentials,
};
use tollgate_core::{ApiSpec, AuthEvent, AuthSource, EventSink, HealthMetric, HealthReporter};

use crate::context::{self, AuthToken, AuthedSession};
use crate::errors::registry::{ERR_AUTH_FIELD_MISSING, ERR_AUTH_NOT_AUTHORISED, ErrorRegistry};
use crate::handler_error::ErrorHandler;

/// Largest request body the body-extraction path will buffer.
const MAX_EXTRACT_BODY_BYTES: usize = 10_000_000;

/// Everything the basic-auth gate needs per API.
#[derive(Clone)]
pub struct BasicAuthState {
    spec: Arc<ApiSpec>,
    resolver: Arc<SessionResolver>,
    verifier: Arc<PasswordVerifier>,
    errors: Arc<ErrorRegistry>,
    handler: Arc<ErrorHandler>,
    events: Arc<dyn EventSink>,
    health: Arc<dyn HealthReporter>,
    body_patterns: Option<BodyExtractorPatterns>,
}

impl BasicAuthState {
    /// Assemble the gate for one API. Compiles the body-extraction
    /// patterns up front when configured, so per-request extraction can
    /// never fail on pattern syntax.
    pub fn new(
        spec: Arc<ApiSpec>,
        resolver: Arc<SessionResolver>,
        verifier: Arc<PasswordVerifier>,
        errors: Arc<ErrorRegistry>,
        handler: Arc<ErrorHandler>,
        events: Arc<dyn EventSink>,
        health: Arc<dyn HealthReporter>,
    ) -> Result<Self, AuthError> {
        let body_patterns = if spec.basic_auth.extract_from_body {
            Some(BodyExtractorPatterns::compile(&spec.basic_auth)?)
        } else {
            None
        };

        Ok(Self {
            spec,
            resolver,
            verifier,
            errors,
            handler,
            events,
            health,
            body_patterns,
        })
    }

    /// Whether this middleware belongs in the chain for an API.
    ///
    /// Body extraction configured with empty or invalid patterns
    /// disables the middleware outright rather than failing requests at
    /// runtime.
    pub fn enabled_for_spec(spec: &ApiSpec) -> bool {
        if !spec.use_basic_auth {
            return false;
        }

        if spec.basic_auth.extract_from_body
            && let Err(e) = BodyExtractorPatterns::compile(&spec.basic_auth)
        {
            tracing::error!(
                api_id = %spec.api_id,
                error = %e,
                "basic auth body extraction misconfigured, middleware disabled"
            );
            return false;
        }

        true
    }

    fn challenge_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!("Basic realm=\"{}\"", self.spec.name)).ok()
    }

    /// Shared failure path for extraction and infrastructure errors.
    fn fail(&self, parts: &Parts, body: Option<&[u8]>, err: &AuthError) -> Response {
        let (message, code) = match err {
            AuthError::MissingCredentials { .. } => {
                self.errors.message_and_code(ERR_AUTH_FIELD_MISSING)
            }
            other => (other.to_string(), other.status_code()),
        };
        let status =
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = self
            .handler
            .handle_error(&self.spec, parts, body, &message, status, true);
        if err.challenge()
            && let Some(value) = self.challenge_value()
        {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }

    /// Failure path for a resolved-or-verified credential that was
    /// denied: emits the security event and the key-failure health
    /// signal on top of the shared handling.
    fn auth_fail(&self, parts: &Parts, token: &str, reason: &str) -> Response {
        self.events.emit(AuthEvent::denied(
            &self.spec.api_id,
            &self.spec.org_id,
            token,
            context::real_ip(&parts.headers, None),
            reason,
        ));
        self.health.report(HealthMetric::KeyFailure, -1);

        let (message, code) = self.errors.message_and_code(ERR_AUTH_NOT_AUTHORISED);
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::UNAUTHORIZED);
        let mut response = self
            .handler
            .handle_error(&self.spec, parts, None, &message, status, true);
        if let Some(value) = self.challenge_value() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

/// The authentication gate, as an axum middleware.
pub async fn basic_auth_middleware(
    State(state): State<BasicAuthState>,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();

    // Kept for the security event; never logged verbatim elsewhere.
    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let header_attempt = credentials::from_authorization_header(
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    );

    let (creds, body) = match header_attempt {
        Ok(creds) => (creds, body),
        Err(header_err) => match &state.body_patterns {
            Some(patterns) => {
                // Body fallback: buffer the body once, extract, restore
                // it for downstream handlers. Header-mode's challenge
                // hint does not apply here; the client was not asked for
                // basic auth.
                let bytes = match axum::body::to_bytes(body, MAX_EXTRACT_BODY_BYTES).await {
                    Ok(bytes) => bytes,
                    Err(_) => {
                        return state.fail(
                            &parts,
                            None,
                            &AuthError::malformed_credentials("unable to read request body"),
                        );
                    }
                };
                match patterns.extract(&bytes) {
                    Ok(creds) => (creds, Body::from(bytes)),
                    Err(body_err) => {
                        return state.fail(&parts, Some(bytes.as_ref()), &body_err);
                    }
                }
            }
            None => return state.fail(&parts, None, &header_err),
        },
    };

    let (session, key) = match state
        .resolver
        .resolve(&state.spec.org_id, &creds.username)
        .await
    {
        Ok(Some(found)) => found,
        Ok(None) => {
            tracing::warn!(api_id = %state.spec.api_id, "attempted access with non-existent user");
            return state.auth_fail(&parts, &token, "user not found");
        }
        Err(err) => return state.fail(&parts, None, &err),
    };

    if let Err(err) = state
        .verifier
        .verify(&session.basic_auth, &creds.password, &state.spec.basic_auth)
        .await
    {
        return match err {
            AuthError::PasswordMismatch => {
                tracing::warn!(
                    api_id = %state.spec.api_id,
                    "attempted access with existing user, failed password check"
                );
                state.auth_fail(&parts, &token, "failed password check")
            }
            other => state.fail(&parts, None, &other),
        };
    }

    // Bind the identity for downstream consumers, respecting the
    // configured identity-provider precedence.
    match state.spec.base_identity_provided_by {
        AuthSource::BasicAuth | AuthSource::Unset => {
            parts.extensions.insert(AuthedSession {
                session,
                key: key.clone(),
            });
            parts.extensions.insert(AuthToken(key));
        }
        AuthSource::AuthToken => {}
    }

    next.run(Request::from_parts(parts, body)).await
}
