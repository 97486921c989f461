//! HTTP layer: request building with retries and buffered responses.

mod request;
mod response;

pub use request::RequestBuilder;
pub use response::Response;
