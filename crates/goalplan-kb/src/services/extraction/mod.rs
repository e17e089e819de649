pub mod payload;
pub mod prompt;
pub mod service;
pub mod validator;

pub use payload::{locate_payload, parse_payload, Payload};
pub use prompt::build_prompt;
pub use service::{ExtractionOptions, ExtractionPipeline, ExtractionService};
pub use validator::{validate_record, Rejection};
