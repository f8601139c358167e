pub mod service;

pub use service::IngestionService;
