pub mod model;
pub mod service;

pub use model::{Category, CategoryVariance, Dashboard, ProjectComparison};
pub use service::ReportService;
