mod clickhouse;
mod domain;
mod nats;
mod postgres;
mod telemetry;

pub use clickhouse::*;
pub use domain::*;
pub use nats::*;
pub use postgres::*;
pub use telemetry::*;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockNodeDirectory;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockPointSink;
