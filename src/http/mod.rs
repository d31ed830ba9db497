pub mod client;
pub mod error;
pub mod method;
pub mod request;
pub mod response;

pub use client::ApiClient;
pub use error::TransportError;
pub use method::HttpMethod;
pub use request::ApiRequest;
pub use response::ApiResponse;
