//! Federal Register API access: request pacing, bounded retries, and
//! per-agency document count fetching.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod limit;

pub use config::{ClientConfig, ConfigError};
pub use error::RequestError;
pub use fetcher::CountFetcher;
pub use http::{HttpResponse, HttpTransport, ReqwestTransport, RetryingClient, TransportError};
pub use limit::RateLimiter;
