//! HTTP transport with host failover.

mod retry;
mod transport;

pub use retry::with_failover;
pub use transport::{FORM_CONTENT_TYPE, HttpTransport, PostRequest, Transport, TransportResponse};

#[cfg(test)]
pub use transport::MockTransport;
