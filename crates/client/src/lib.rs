//! HTTP client for the tally REST backend.
//!
//! The client is the only component that talks to the network. It owns the
//! session (access/refresh token pair), attaches the bearer token to every
//! request and recovers from an expired access token with a single refresh
//! shared by all concurrent callers.
//!
//! ```no_run
//! # async fn demo() -> client::Result<()> {
//! use api_types::expense::Expense;
//! use client::{ApiClient, FileTokenStore, Session};
//!
//! let session = Session::new(FileTokenStore::new("config/tally_session.json"));
//! let api = ApiClient::builder()
//!     .base_url("http://localhost:8000")
//!     .session(session)
//!     .build()?;
//!
//! api.login("alice", "secret").await?;
//! let expenses: Vec<Expense> = api.list().await?;
//! # Ok(())
//! # }
//! ```

pub use error::{ClientError, RefreshError, Result, StoreError};
pub use http::{ApiClient, ApiClientBuilder, REFRESH_ENDPOINT, RequestOptions, TOKEN_ENDPOINT};
pub use resources::{DASHBOARD_ENDPOINT, Resource};
pub use session::{AuthState, Session};
pub use tokens::{FileTokenStore, MemoryTokenStore, TokenStore, Tokens};

pub use reqwest::{Method, StatusCode, header};

mod error;
mod http;
mod refresh;
mod resources;
mod session;
mod tokens;
