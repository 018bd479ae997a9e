//! Typed clients for the Budgetly backend.
//!
//! Everything that talks to the network lives here: the session context,
//! authentication, the remote budget store, the dashboard view with its
//! optimistic writes, category edit sessions and the budget assistant.
//!
//! # Modules
//!
//! - `session` - Session context and token persistence
//! - `api` - Shared HTTP plumbing and error mapping
//! - `auth` - Login, registration and session restore
//! - `store` - `BudgetStore` trait with HTTP and in-memory implementations
//! - `view` - Dashboard view with sequence-guarded loads
//! - `editor` - Category edit sessions
//! - `assistant` - Budget assistant chat

pub mod api;
pub mod assistant;
pub mod auth;
pub mod editor;
pub mod session;
pub mod store;
pub mod view;

pub use api::ApiClient;
pub use assistant::{AssistantClient, ChatBackend, ChatMessage, Conversation, Role};
pub use auth::{AuthClient, LoginRequest, RegisterRequest};
pub use editor::CategoryEditSession;
pub use session::{
    FileTokenStore, MemoryTokenStore, Session, SessionContext, TokenStore, User,
};
pub use store::{BudgetStore, HttpBudgetStore, InMemoryBudgetStore};
pub use view::{BudgetView, LoadOutcome, LoadState};
