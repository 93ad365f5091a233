//! Remote QnA service client implementations

mod http_client;
mod management;
mod runtime;

pub use http_client::{HttpClient, HttpClientTrait};
pub use management::{QnaMakerClient, QnaMakerConfig};
pub use runtime::{QnaRuntimeClient, QnaRuntimeConfig};
