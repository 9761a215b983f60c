//! # CVPerfect edge
//!
//! Server-side half of the CVPerfect web frontend: decides which pages a visitor may
//! reach and keeps the client's view of the signed-in user in step with the backend.
//!
//! ## Route guard
//!
//! Every navigable path except API auth endpoints and static assets passes through
//! [`guard::RouteGuard`]. Visitors without a session credential are sent to
//! `/auth/signin?callbackUrl=<original url>`; signed-in visitors who open an auth page
//! are sent to `/dashboard`. An unreadable credential counts as absent.
//!
//! ## Session store
//!
//! [`session::SessionStore`] owns the current [`session::UserProfile`] and a `loading`
//! flag, talks to the backend through [`session::AuthApi`], and mirrors the profile
//! into an [`session::EphemeralCache`] so a fresh page can render a name before the
//! backend answers. Overlapping operations resolve last-initiated-wins.
//!
//! ## Billing
//!
//! [`billing::catalog`] is the fixed plan list rendered on the billing page.

pub mod billing;
pub mod cli;
pub mod cvperfect;
pub mod guard;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
