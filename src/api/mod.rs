// Management API client

pub mod client;
pub mod envelope;
pub mod middleware;
pub mod transport;


pub use client::{ApiClient, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use envelope::{RequestEnvelope, ResponseEnvelope};
pub use middleware::{AuthEvents, Pipeline, RequestMiddleware, RequestTrace, ResponseMiddleware};
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
pub use transport::MockTransport;
