//! HTTP client SDK for the Minds AI data platform.
//!
//! This crate provides a typed client for managing datasources and minds and
//! for asking minds questions through the chat completion endpoint.
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use minds_client::{CreateMind, Datasource, MindUpdate, MindsClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = MindsClient::builder()
//!     .api_key("secret")
//!     .build()?;
//!
//! // Provision a datasource inline while creating a mind
//! let mind = client
//!     .minds()
//!     .create(
//!         CreateMind::new("sales_mind")
//!             .provider("openai")
//!             .prompt_template("answer in german")
//!             .datasource(Datasource::example())
//!             .replace(true),
//!     )
//!     .await?;
//!
//! // Mutations return a fresh snapshot
//! let mind = mind
//!     .update(MindUpdate::new().prompt_template("answer in spanish"))
//!     .await?;
//!
//! // Buffered answer
//! let answer = mind.completion("say hello").await?;
//! println!("{}", answer);
//!
//! // Streamed answer
//! let mut stream = mind.completion_stream("say hello").await?;
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk?.content);
//! }
//!
//! // Idempotent cleanup
//! client.minds().drop_if_exists("sales_mind").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Every call surfaces service failures as [`Error`]. [`Error::NotFound`] is
//! the one callers are expected to match on routinely; the `drop_if_exists`
//! helpers do that for cleanup. Multi-step calls do not roll back: a datasource
//! provisioned for a mind stays in place when creating the mind fails.

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::{
    Collection, CompletionStream, CompletionsApi, DatasourcesApi, Mind, MindsApi, Resource,
};
pub use client::{ClientBuilder, MindsClient, DEFAULT_BASE_URL, DEFAULT_PROJECT};
pub use error::{Error, Result};
pub use types::*;
