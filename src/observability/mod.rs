pub mod health;
pub mod logging;

pub use health::{AggregatedHealth, DependencyHealth, HealthChecker, HealthStatus};
pub use logging::{init_logging, mask_amount, mask_sensitive, mask_uuid, LogConfig, LogFormat, RequestSpan};
