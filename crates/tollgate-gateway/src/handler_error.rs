//! The shared failure path.
//!
//! Any middleware that halts a request with an error code goes through
//! [`ErrorHandler::handle_error`]: it renders the content-negotiated
//! error body, applies the response headers, dispatches one analytics
//! record describing the outcome, and reports the health signal. The
//! analytics side never fails the response — by the time recording runs
//! the response is already committed.

use std::io::Write;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode, header, request::Parts};
use axum::response::Response;
use base64::{Engine, engine::general_purpose::STANDARD};

use tollgate_analytics::{AnalyticsDispatcher, AnalyticsRecord, normalize_path, resolve_retention};
use tollgate_core::{ApiSpec, GatewayConfig, HealthMetric, HealthReporter};

use crate::context::{self, AuthToken, AuthedSession, SuppressTracking, TrackedPath};
use crate::errors::templates::{self, TemplateFormat, TemplateRegistry};

/// Identifies the gateway on error responses unless suppressed.
pub const GENERATOR_HEADER: &str = "x-generator";
pub const GENERATOR_NAME: &str = "tollgate";

const NON_VERSIONED: &str = "Non Versioned";

/// Renders error responses and records request outcomes.
pub struct ErrorHandler {
    templates: Arc<TemplateRegistry>,
    dispatcher: AnalyticsDispatcher,
    health: Arc<dyn HealthReporter>,
    config: Arc<GatewayConfig>,
}

impl ErrorHandler {
    pub fn new(
        templates: Arc<TemplateRegistry>,
        dispatcher: AnalyticsDispatcher,
        health: Arc<dyn HealthReporter>,
        config: Arc<GatewayConfig>,
    ) -> Self {
        Self {
            templates,
            dispatcher,
            health,
            config,
        }
    }

    /// Handle one failed request.
    ///
    /// `write_response` controls whether an error body is rendered; some
    /// callers only need the recording side effect because a response has
    /// already been written. `body` is the buffered request body when the
    /// caller happens to have one, used for detail recording only.
    pub fn handle_error(
        &self,
        spec: &ApiSpec,
        parts: &Parts,
        body: Option<&[u8]>,
        err_msg: &str,
        err_code: StatusCode,
        write_response: bool,
    ) -> Response {
        let response = if write_response {
            self.write_response(parts, err_msg, err_code)
        } else {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = err_code;
            response
        };

        if spec.do_not_track {
            return response;
        }

        let ip = context::real_ip(&parts.headers, None);
        if self.config.store_analytics(&ip) {
            self.record_outcome(spec, parts, body, err_code, &ip);
        }

        self.health.report(HealthMetric::BlockedRequest, -1);

        response
    }

    fn write_response(&self, parts: &Parts, err_msg: &str, err_code: StatusCode) -> Response {
        let requested = TemplateFormat::from_content_type(
            parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let (template, served) = self.templates.resolve(err_code.as_u16(), requested);

        let mut response = Response::new(Body::from(templates::render(template, err_msg)));
        *response.status_mut() = err_code;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(served.content_type()),
        );

        if !self.config.hide_generator_header {
            response.headers_mut().insert(
                HeaderName::from_static(GENERATOR_HEADER),
                HeaderValue::from_static(GENERATOR_NAME),
            );
        }

        if self.config.close_connections {
            response
                .headers_mut()
                .insert(header::CONNECTION, HeaderValue::from_static("close"));
        }

        response
    }

    fn record_outcome(
        &self,
        spec: &ApiSpec,
        parts: &Parts,
        body: Option<&[u8]>,
        err_code: StatusCode,
        ip: &str,
    ) {
        let mut record = AnalyticsRecord::stamped_now();

        let raw_path = normalize_path(parts.uri.path());
        let (path, track_path) = match (
            parts.extensions.get::<TrackedPath>(),
            parts.extensions.get::<SuppressTracking>(),
        ) {
            (Some(tracked), None) => (tracked.0.clone(), true),
            _ => (raw_path.clone(), false),
        };

        let session = parts.extensions.get::<AuthedSession>();
        let mut tags = Vec::new();
        if let Some(authed) = session {
            tags.extend(authed.session.tags.iter().cloned());
        }
        for header_name in &spec.tag_headers {
            if let Some(value) = parts
                .headers
                .get(header_name.as_str())
                .and_then(|v| v.to_str().ok())
            {
                tags.push(format!("{}-{}", header_name.to_lowercase(), value));
            }
        }

        record.method = parts.method.to_string();
        record.host = parts
            .uri
            .host()
            .map(str::to_string)
            .unwrap_or_else(|| spec.target_host.clone());
        record.path = path;
        record.raw_path = raw_path;
        record.content_length = parts
            .headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .or_else(|| body.map(|b| b.len() as i64))
            .unwrap_or(0);
        record.user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        record.response_code = err_code.as_u16();
        record.api_key = parts
            .extensions
            .get::<AuthToken>()
            .map(|token| token.0.clone())
            .unwrap_or_default();
        record.api_version = parts
            .headers
            .get(spec.version_header.as_str())
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(NON_VERSIONED)
            .to_string();
        record.api_name = spec.name.clone();
        record.api_id = spec.api_id.clone();
        record.org_id = spec.org_id.clone();
        if spec.enable_detail_recording {
            record.raw_request = STANDARD.encode(wire_format_request(parts, body));
        }
        record.ip_address = ip.to_string();
        record.tags = tags;
        record.alias = session
            .map(|authed| authed.session.alias.clone())
            .unwrap_or_default();
        record.track_path = track_path;
        record.set_expiry(resolve_retention(
            spec.expire_analytics_after,
            self.config.enforce_org_data_age,
            spec.org_data_age,
        ));

        self.dispatcher.record(record);
    }
}

/// Reconstruct the wire-level byte representation of a request for
/// detail recording.
fn wire_format_request(parts: &Parts, body: Option<&[u8]>) -> Vec<u8> {
    let mut buf = Vec::new();
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let _ = write!(buf, "{} {} HTTP/1.1\r\n", parts.method, target);
    for (name, value) in &parts.headers {
        let _ = write!(buf, "{name}: ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(b"\r\n");
    if let Some(body) = body {
        buf.extend_from_slice(body);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use std::time::Duration;
    use tollgate_analytics::MemoryBackend;
    use tollgate_core::{CountingHealthReporter, Session};

    struct Harness {
        handler: ErrorHandler,
        backend: Arc<MemoryBackend>,
        health: Arc<CountingHealthReporter>,
    }

    fn harness(config: GatewayConfig) -> Harness {
        let backend = Arc::new(MemoryBackend::new());
        let health = Arc::new(CountingHealthReporter::new());
        let handler = ErrorHandler::new(
            Arc::new(TemplateRegistry::with_defaults()),
            AnalyticsDispatcher::new(backend.clone()),
            health.clone(),
            Arc::new(config),
        );
        Harness {
            handler,
            backend,
            health,
        }
    }

    fn request_parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    async fn wait_for_record(backend: &MemoryBackend) -> AnalyticsRecord {
        for _ in 0..100 {
            if let Some(record) = backend.records().into_iter().next() {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no analytics record arrived");
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn renders_negotiated_body_and_headers() {
        let h = harness(GatewayConfig::default());
        let parts = request_parts(
            Request::builder()
                .uri("/test")
                .header(header::CONTENT_TYPE, "application/xml"),
        );

        let response = h.handler.handle_error(
            &ApiSpec::default(),
            &parts,
            None,
            "no such key",
            StatusCode::FORBIDDEN,
            true,
        );

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/xml"
        );
        assert_eq!(response.headers().get(GENERATOR_HEADER).unwrap(), "tollgate");
        assert!(response.headers().get(header::CONNECTION).is_none());
        assert!(body_string(response).await.contains("no such key"));
    }

    #[tokio::test]
    async fn generator_header_can_be_hidden_and_connection_closed() {
        let h = harness(GatewayConfig {
            hide_generator_header: true,
            close_connections: true,
            ..GatewayConfig::default()
        });
        let parts = request_parts(Request::builder().uri("/test"));

        let response = h.handler.handle_error(
            &ApiSpec::default(),
            &parts,
            None,
            "oops",
            StatusCode::UNAUTHORIZED,
            true,
        );

        assert!(response.headers().get(GENERATOR_HEADER).is_none());
        assert_eq!(response.headers().get(header::CONNECTION).unwrap(), "close");
    }

    #[tokio::test]
    async fn skips_body_when_response_already_written() {
        let h = harness(GatewayConfig::default());
        let parts = request_parts(Request::builder().uri("/test"));

        let response = h.handler.handle_error(
            &ApiSpec::default(),
            &parts,
            None,
            "recorded only",
            StatusCode::BAD_GATEWAY,
            false,
        );

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_string(response).await.is_empty());
        // The recording side effect still happened.
        let record = wait_for_record(&h.backend).await;
        assert_eq!(record.response_code, 502);
    }

    #[tokio::test]
    async fn record_captures_request_shape() {
        let h = harness(GatewayConfig::default());
        let spec = ApiSpec {
            api_id: "api-1".to_string(),
            name: "Payments".to_string(),
            org_id: "org-1".to_string(),
            tag_headers: vec!["x-team".to_string()],
            ..ApiSpec::default()
        };

        let mut session = Session::default();
        session.alias = "alice".to_string();
        session.tags = vec!["gold".to_string()];
        let parts = request_parts(
            Request::builder()
                .method("POST")
                .uri("/payments/charge")
                .header(header::USER_AGENT, "curl/8.0")
                .header("x-team", "checkout")
                .header("x-api-version", "v2")
                .extension(AuthedSession {
                    session,
                    key: "org-1abc".to_string(),
                })
                .extension(AuthToken("org-1abc".to_string())),
        );

        h.handler
            .handle_error(&spec, &parts, None, "denied", StatusCode::UNAUTHORIZED, true);

        let record = wait_for_record(&h.backend).await;
        assert_eq!(record.method, "POST");
        assert_eq!(record.raw_path, "/payments/charge");
        assert_eq!(record.path, "/payments/charge");
        assert!(!record.track_path);
        assert_eq!(record.user_agent, "curl/8.0");
        assert_eq!(record.api_version, "v2");
        assert_eq!(record.api_name, "Payments");
        assert_eq!(record.api_key, "org-1abc");
        assert_eq!(record.alias, "alice");
        assert_eq!(record.tags, vec!["gold", "x-team-checkout"]);
        assert_eq!(h.health.values(HealthMetric::BlockedRequest), vec![-1]);
    }

    #[tokio::test]
    async fn tracked_path_wins_unless_suppressed() {
        let h = harness(GatewayConfig::default());

        let parts = request_parts(
            Request::builder()
                .uri("/widgets/123")
                .extension(TrackedPath("/widgets/{id}".to_string())),
        );
        h.handler.handle_error(
            &ApiSpec::default(),
            &parts,
            None,
            "x",
            StatusCode::NOT_FOUND,
            true,
        );

        let record = wait_for_record(&h.backend).await;
        assert_eq!(record.path, "/widgets/{id}");
        assert_eq!(record.raw_path, "/widgets/123");
        assert!(record.track_path);
    }

    #[tokio::test]
    async fn suppressed_tracking_keeps_raw_path() {
        let h = harness(GatewayConfig::default());

        let parts = request_parts(
            Request::builder()
                .uri("/widgets/123")
                .extension(TrackedPath("/widgets/{id}".to_string()))
                .extension(SuppressTracking),
        );
        h.handler.handle_error(
            &ApiSpec::default(),
            &parts,
            None,
            "x",
            StatusCode::NOT_FOUND,
            true,
        );

        let record = wait_for_record(&h.backend).await;
        assert_eq!(record.path, "/widgets/123");
        assert!(!record.track_path);
    }

    #[tokio::test]
    async fn detail_recording_captures_wire_request() {
        let h = harness(GatewayConfig::default());
        let spec = ApiSpec {
            enable_detail_recording: true,
            ..ApiSpec::default()
        };
        let parts = request_parts(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/json"),
        );

        h.handler.handle_error(
            &spec,
            &parts,
            Some(b"{\"user\":\"alice\"}"),
            "x",
            StatusCode::UNAUTHORIZED,
            true,
        );

        let record = wait_for_record(&h.backend).await;
        let wire = STANDARD.decode(&record.raw_request).unwrap();
        let wire = String::from_utf8(wire).unwrap();
        assert!(wire.starts_with("POST /login HTTP/1.1\r\n"));
        assert!(wire.contains("content-type: application/json\r\n"));
        assert!(wire.ends_with("{\"user\":\"alice\"}"));
        assert_eq!(record.content_length, 16);
    }

    #[tokio::test]
    async fn do_not_track_skips_record_and_health() {
        let h = harness(GatewayConfig::default());
        let spec = ApiSpec {
            do_not_track: true,
            ..ApiSpec::default()
        };
        let parts = request_parts(Request::builder().uri("/test"));

        let response =
            h.handler
                .handle_error(&spec, &parts, None, "x", StatusCode::UNAUTHORIZED, true);

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(h.backend.is_empty());
        assert!(h.health.values(HealthMetric::BlockedRequest).is_empty());
    }

    #[tokio::test]
    async fn ignored_ip_skips_record_but_still_reports_health() {
        let h = harness(GatewayConfig {
            analytics_ignored_ips: vec!["203.0.113.7".to_string()],
            ..GatewayConfig::default()
        });
        let parts = request_parts(
            Request::builder()
                .uri("/test")
                .header("x-real-ip", "203.0.113.7"),
        );

        h.handler.handle_error(
            &ApiSpec::default(),
            &parts,
            None,
            "x",
            StatusCode::UNAUTHORIZED,
            true,
        );

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(h.backend.is_empty());
        assert_eq!(h.health.values(HealthMetric::BlockedRequest), vec![-1]);
    }

    #[tokio::test]
    async fn org_cap_overrides_api_retention() {
        let h = harness(GatewayConfig {
            enforce_org_data_age: true,
            ..GatewayConfig::default()
        });
        let spec = ApiSpec {
            expire_analytics_after: 3600,
            org_data_age: 60,
            ..ApiSpec::default()
        };
        let parts = request_parts(Request::builder().uri("/test"));

        h.handler
            .handle_error(&spec, &parts, None, "x", StatusCode::UNAUTHORIZED, true);

        let record = wait_for_record(&h.backend).await;
        assert_eq!(
            record.expire_at.unix_timestamp() - record.timestamp.unix_timestamp(),
            60
        );
    }
}
