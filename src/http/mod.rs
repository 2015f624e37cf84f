//! HTTP client module for the Vigil scanner

pub mod client;
pub use client::HttpClient;
