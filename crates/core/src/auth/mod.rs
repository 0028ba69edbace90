//! Authorization code + PKCE flow
//!
//! State machine per attempt:
//!
//! ```text
//! begin_authorization ──► AwaitingCallback ──► complete_authorization ──► Exchanged
//!                               │                        │
//!                               └── 300s ──► Expired     └──► Failed
//! ```
//!
//! `AwaitingCallback` is the `oauth:state:<state>` entry in the store. It is
//! consumed atomically, so `Expired`, `Failed` and `Exchanged` all leave
//! nothing behind and any replay reports `InvalidState`.

pub mod flow;
pub mod state;

pub use flow::OAuthFlowManager;
pub use state::{AuthorizationRequest, PKCEState};
