pub mod integration;
pub mod payload;
pub mod template;

pub use integration::IntegrationRecord;
pub use payload::{build_clone_payload, CustomizationPayload};
pub use template::TemplateRecord;
