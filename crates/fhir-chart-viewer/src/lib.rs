//! FHIR Chart Viewer
//!
//! Signs a patient in to a SMART on FHIR sandbox with the OAuth 2.0
//! authorization code grant and PKCE (S256), then fetches and renders their
//! demographics, active medications, lab results and vital signs.
//!
//! # Features
//!
//! - **PKCE sign-in**: per-session `state` and verifier, consumed on callback
//! - **Concurrent reads**: the four FHIR queries run together and render
//!   independently
//! - **Local redirect target**: an axum server on `http://localhost:3000`
//!
//! # Example
//!
//! ```no_run
//! use std::net::SocketAddr;
//!
//! use fhir_chart_viewer::{config::Config, server::ChartServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = ChartServer::new(config)?;
//!
//!     server.run(SocketAddr::from(([127, 0, 0, 1], 3000))).await
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod server;

pub use client::FhirClient;
pub use config::Config;
pub use error::{AuthError, ClientError};
