//! Vigil - Black-box SQL Injection Scanner
//!
//! Probes the parameters of crawled HTTP requests for server-side SQL
//! injection using five detection strategies: error signatures, time
//! delays, boolean differentials, content-length growth, and login
//! bypass. Findings are reported per parameter with the payload and
//! evidence that triggered detection.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod payloads;
pub mod scanner;
