//! Client for the UniSender email/SMS marketing HTTP API.
//!
//! Every remote method is reachable through [`Client::call`], which form-encodes
//! the parameters, POSTs them and decodes the JSON answer. Transport failures
//! are retried immediately, alternating between the service's two hosts.
//!
//! ```no_run
//! use unisender::{Client, ClientConfig, Params};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), unisender::ApiError> {
//!     let client = Client::new(ClientConfig::new("api-key").retry_count(2))?;
//!     let lists = client.call("getLists", Params::new()).await?;
//!     println!("{}", lists);
//!
//!     client.subscribe("1,2", "user@example.com", Params::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod compression;
pub mod config;
pub mod encoding;
pub mod error;
pub mod http;
pub mod methods;
pub mod params;
pub mod response;

pub use client::{ApiResult, Client};
pub use config::{ClientConfig, Hosts};
pub use error::ApiError;
pub use methods::{ContactType, EmailMessage, SubscribeFields};
pub use params::{Param, Params};
pub use response::RemoteError;
