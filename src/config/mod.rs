//! Configuration module

mod service;

pub use service::AggregationConfig;
pub use service::AggregationPolicy;
pub use service::RepositoryConfig;
pub use service::Secrets;
pub use service::ServiceConfig;
