//! Client for the projects REST API of the service under test
//!
//! ```ignore
//! let client = ProjectsClient::new(&settings)?;
//! let response = client.create_project(&ProjectPayload::titled("Demo")).await?;
//! assert!(client.is_successful_response(&response, &[201]));
//! ```

pub mod client;
pub mod error;
pub mod response;
pub mod types;

pub use client::{HttpVerb, ProjectsClient, DEFAULT_DELETION_ATTEMPTS};
pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;
pub use types::{Project, ProjectPayload};
