pub mod service;

pub use service::GraphService;
