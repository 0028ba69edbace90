//! OAuth 2.0 + PKCE primitives
//!
//! This module provides the provider-facing half of the authorization code
//! flow: PKCE generation, the token endpoint client and the token records
//! that are persisted once a flow completes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ OAuthClientTrait │  Seam used by the flow manager
//! └────────┬─────────┘
//!          │
//!          ├──► OAuthClient     (reqwest, token endpoint calls)
//!          └──► PKCE utilities  (verifier, challenge, state)
//! ```
//!
//! Single-use `state` tracking lives with the flow manager, which persists
//! it in a [`TimedStore`](crate::cache::TimedStore).
//!
//! # Usage Example
//!
//! ```no_run
//! use profilelink_common::auth::{OAuthClient, OAuthConfig, PKCEChallenge};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OAuthConfig::new(
//!     "https://www.linkedin.com/oauth/v2".to_string(),
//!     "client-id".to_string(),
//!     "client-secret".to_string(),
//!     "http://localhost:3000/callback".to_string(),
//!     vec!["openid".to_string(), "profile".to_string()],
//! );
//! let client = OAuthClient::new(config)?;
//!
//! let challenge = PKCEChallenge::generate();
//! let url = client.authorization_url(&challenge);
//! println!("open {url}");
//!
//! // ... user authorizes, redirect delivers `code` ...
//! let tokens = client.exchange_code("code", &challenge.code_verifier).await?;
//! println!("expires in {}s", tokens.expires_in);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod pkce;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, OAuthClientError, DEFAULT_TOKEN_TIMEOUT};
pub use pkce::{generate_code_challenge, generate_code_verifier, generate_state, PKCEChallenge};
pub use traits::OAuthClientTrait;
pub use types::{OAuthConfig, TokenRecord, TokenResponse};
