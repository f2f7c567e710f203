//! HTTP transport for the attribution backend.

mod reqwest_client;

pub use reqwest_client::ReqwestHttpClient;
