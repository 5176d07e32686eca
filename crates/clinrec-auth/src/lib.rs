//! # clinrec-auth
//!
//! Credential manager for the ClinRec record-access subsystem.
//!
//! This crate provides:
//! - Argon2id password hashing and the password policy
//! - Identity and session types
//! - Storage traits for the identity store (identities and sessions)
//! - The [`CredentialManager`] orchestrating register / authenticate /
//!   validate / invalidate
//! - Session cookie construction
//!
//! ## Modules
//!
//! - [`config`] - Credential manager configuration
//! - [`error`] - Authentication error types
//! - [`identity`] - Identity type and username/email format rules
//! - [`session`] - Session type and token generation
//! - [`password`] - Password policy and Argon2id hashing
//! - [`storage`] - Storage traits implemented by backends
//! - [`manager`] - The credential manager itself
//! - [`cookie`] - Session cookie construction

pub mod config;
pub mod cookie;
pub mod error;
pub mod identity;
pub mod manager;
pub mod password;
pub mod session;
pub mod storage;

pub use config::{AuthConfig, PasswordPolicy};
pub use cookie::{SESSION_COOKIE_NAME, removal_cookie, session_cookie};
pub use error::AuthError;
pub use identity::{Identity, normalize_email, normalize_username};
pub use manager::CredentialManager;
pub use password::{hash_password, policy_violations, verify_password};
pub use session::Session;
pub use storage::{IdentityStorage, SessionStorage};

/// Type alias for credential manager results.
pub type AuthResult<T> = Result<T, AuthError>;
