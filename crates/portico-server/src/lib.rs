//! Local preview server and source watcher for portico sites.
//!
//! Serves a built output directory over HTTP and reports source changes so a
//! caller can rebuild.

pub mod server;
pub mod watcher;

pub use server::{router, PreviewServer, ServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
