pub mod query;
pub mod request;
pub mod response;

pub use query::{FieldValue, QueryResult, QueryRow};
pub use request::{InboundRequest, PromptRequest};
pub use response::{CORS_HEADERS, OutboundResponse, cors_headers};
