//! fetchgraph client - a remote data service over NNG.
//!
//! # Quick Start
//!
//! ```ignore
//! use fetchgraph_client::{Client, ClientConfig};
//! use fetchgraph_core::{Conditions, RawQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect(ClientConfig::localhost()).await?;
//!
//!     let rows = RawQuery::new("contact")
//!         .filter(|f| f.begins_with("fullname", "Ada"))
//!         .execute(&client)
//!         .await?;
//!     println!("Found {} contacts", rows.len());
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod error;

pub use client::Client;
pub use config::ClientConfig;
pub use connection::{Connection, ConnectionState};
pub use error::Error;

/// Re-export protocol types.
pub use fetchgraph_proto as proto;
