pub mod aggregate;
pub mod service;

pub use service::{DashboardView, Report, ReportingService};
