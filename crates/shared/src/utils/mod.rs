mod logs;
mod metrics;
mod otel;
mod validation;

pub use self::logs::init_logger;
pub use self::metrics::{Labels, Method, Metrics, Status};
pub use self::otel::{OperationTracer, Telemetry, TracingContext};
pub use self::validation::{format_validation_errors, validate_request};
