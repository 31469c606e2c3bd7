//! # Desktop Bridge Implementations
//!
//! Default implementation of the HTTP bridge for desktop platforms
//! (macOS, Windows, Linux), backed by `reqwest` with rustls.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use provider_google_drive::GoogleDriveClient;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! let drive = GoogleDriveClient::new(http_client, access_token);
//! ```

mod http;

pub use http::ReqwestHttpClient;
