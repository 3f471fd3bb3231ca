//! HTTP gateway to the timesheet backend and the role cost service.

mod base_url;
pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod session;
pub mod session_store;

pub use base_url::BaseUrl;
pub use client::{ApiClient, BatchOutcome};
pub use config::ClientConfig;
pub use dto::ApprovalDecision;
pub use error::{CreateEntriesError, GatewayError, GatewayResult};
pub use session::{login_as, CurrentUser, Session};
pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore};
