mod dto;
pub mod memory;
pub mod metrics;
pub mod repo;
pub mod repo_types;

pub use dto::HealthView;
pub use metrics::{body_metrics, BmiCategory, BodyMetrics};
pub use repo::{HealthStore, PgHealthStore};
pub use repo_types::{Gender, HealthRecord};
