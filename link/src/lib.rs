//! Client library for Meridian database servers.
//!
//! Provides the authenticated session the `meridian` shell talks through:
//! token-based login, a bounded relogin-and-retry policy for expired
//! sessions, and statement execution over HTTP+JSON.
//!
//! # Examples
//!
//! ```rust,no_run
//! use meridian_link::{Credentials, LinkClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LinkClient::builder()
//!     .base_url("http://127.0.0.1:5654")
//!     .credentials(Credentials::new("sys", "manager"))
//!     .build()?;
//!
//! let outcome = client.execute_statement("select * from example").await?;
//! println!("{} rows", outcome.row_count());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use auth::Credentials;
pub use client::{LinkClient, LinkClientBuilder};
pub use error::{LinkError, Result};
pub use models::{Column, QueryOutcome};
