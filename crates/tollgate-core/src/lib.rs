pub mod api;
pub mod config;
pub mod events;
pub mod health;
pub mod session;

pub use api::{ApiSpec, AuthSource, BasicAuthConfig};
pub use config::{ErrorOverride, GatewayConfig};
pub use events::{AuthEvent, AuthEventType, EventSink, TracingEventSink};
pub use health::{CountingHealthReporter, HealthMetric, HealthReporter, NoopHealthReporter};
pub use session::{BasicAuthData, HashKind, Session};
