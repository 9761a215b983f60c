//! Session store for the page runtime.
//!
//! The store is the in-page authority for who is signed in. It is created once per
//! page tree and passed explicitly to whoever needs it; there is no global instance.
//!
//! ## Flow
//!
//! 1. **Activate:** the first [`SessionStore::activate`] calls `GET /api/auth/me`.
//!    Failures of any kind settle the store as signed out.
//! 2. **Transitions:** `sign_in`/`sign_up` replace the profile, `sign_out` clears it
//!    once the backend confirms. The newest started operation always wins.
//! 3. **Mirror:** each transition rewrites the per-tab [`EphemeralCache`] after the
//!    in-memory profile is set. The mirror is a hint, never a source of truth.
//!
//! Passwords travel as `SecretString` and are never logged.

pub mod cache;
pub mod client;
pub mod error;
pub mod notify;
pub mod store;
pub mod types;

pub use cache::{EphemeralCache, MemoryCache, StaleProfile};
pub use client::{AuthApi, HttpAuthApi};
pub use error::AuthError;
pub use notify::{Navigator, NoopNavigator, Notifier, TracingNotifier};
pub use store::{SessionStatus, SessionStore, SessionStoreBuilder};
pub use types::{PlanTier, Subscription, SubscriptionStatus, UserProfile};
