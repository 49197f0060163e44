// Adapters layer: concrete implementations of the domain ports.

pub mod auth;
pub mod http;

pub use auth::TokenAuth;
pub use http::ReqwestTransport;
