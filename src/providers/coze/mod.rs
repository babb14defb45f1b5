pub mod client;
pub mod types;

pub use client::CozeClient;
pub use types::{ContentPart, ContentType, UpstreamMessage, UploadedFile};
