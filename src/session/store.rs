use super::{
    cache::{self, EphemeralCache, MemoryCache},
    client::AuthApi,
    error::AuthError,
    notify::{Navigator, NoopNavigator, Notifier, TracingNotifier},
    types::UserProfile,
};
use secrecy::SecretString;
use std::{
    collections::BTreeSet,
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};
use tracing::{debug, instrument};

pub use crate::guard::SIGN_IN_PATH;

/// What consumers may conclude from the store right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No profile yet and a session check is still in flight: wait.
    Loading,
    SignedIn,
    /// No profile and no session check in flight: definitely signed out.
    SignedOut,
}

#[derive(Debug)]
struct State {
    profile: Option<UserProfile>,
    loading: bool,
    /// Session checks currently waiting on the backend.
    checks: usize,
    /// Operations that started and may still apply an outcome.
    live: BTreeSet<u64>,
    /// Ticket of the last outcome applied.
    applied: u64,
}

impl State {
    /// An outcome is stale once a newer operation has applied, or is still live.
    fn is_stale(&self, ticket: u64) -> bool {
        self.applied > ticket || self.live.range(ticket + 1..).next().is_some()
    }
}

/// Holds the current user for one page session.
///
/// Every mutating operation takes a ticket when it starts. Its outcome is applied
/// only while no newer operation has applied or is still in flight, so the most
/// recently initiated operation wins. An operation that ends without an outcome
/// (a failed call, a dropped future) withdraws its ticket and no longer blocks
/// older ones.
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    cache: Arc<dyn EphemeralCache>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    state: RwLock<State>,
    sequence: AtomicU64,
    activated: AtomicBool,
}

pub struct SessionStoreBuilder {
    api: Arc<dyn AuthApi>,
    cache: Arc<dyn EphemeralCache>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl SessionStoreBuilder {
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn EphemeralCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    #[must_use]
    pub fn build(self) -> SessionStore {
        SessionStore {
            api: self.api,
            cache: self.cache,
            notifier: self.notifier,
            navigator: self.navigator,
            state: RwLock::new(State {
                profile: None,
                loading: true,
                checks: 0,
                live: BTreeSet::new(),
                applied: 0,
            }),
            sequence: AtomicU64::new(0),
            activated: AtomicBool::new(false),
        }
    }
}

/// One in-flight operation. Dropping it withdraws the ticket and, for a session
/// check, clears `loading` once no other check is still waiting.
struct Ticket<'a> {
    store: &'a SessionStore,
    id: u64,
    check: bool,
}

impl Ticket<'_> {
    fn apply(&self, profile: Option<UserProfile>) -> bool {
        self.store.apply(self.id, profile)
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        let mut state = self.store.write_state();
        state.live.remove(&self.id);
        if self.check {
            state.checks = state.checks.saturating_sub(1);
            if state.checks == 0 {
                state.loading = false;
            }
        }
    }
}

impl SessionStore {
    #[must_use]
    pub fn builder(api: Arc<dyn AuthApi>) -> SessionStoreBuilder {
        SessionStoreBuilder {
            api,
            cache: Arc::new(MemoryCache::new()),
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(NoopNavigator),
        }
    }

    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.read_state().profile.clone()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.read_state().loading
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        let state = self.read_state();
        match (&state.profile, state.loading) {
            (Some(_), _) => SessionStatus::SignedIn,
            (None, true) => SessionStatus::Loading,
            (None, false) => SessionStatus::SignedOut,
        }
    }

    /// The per-tab mirror this store writes.
    #[must_use]
    pub fn cache(&self) -> &dyn EphemeralCache {
        self.cache.as_ref()
    }

    /// Run the initial session check. Only the first call does anything;
    /// returns whether this call ran it.
    pub async fn activate(&self) -> bool {
        if self.activated.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.initialize().await;
        true
    }

    /// Ask the backend who is signed in. Never fails: any error means signed out.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        let ticket = self.begin(true);

        match self.api.me().await {
            Ok(profile) => {
                ticket.apply(Some(profile));
            }
            Err(err) => {
                debug!("session check failed: {err}");
                ticket.apply(None);
            }
        }
    }

    /// # Errors
    /// Returns the backend or transport error; the profile is left untouched.
    #[instrument(skip(self, email, password))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserProfile, AuthError> {
        let ticket = self.begin(false);
        let result = self.api.sign_in(email, password).await;
        self.settle_profile(&ticket, result, "Signed in successfully")
    }

    /// # Errors
    /// Returns the backend or transport error; the profile is left untouched.
    #[instrument(skip(self, email, password, full_name))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        full_name: &str,
    ) -> Result<UserProfile, AuthError> {
        let ticket = self.begin(false);
        let result = self.api.sign_up(email, password, full_name).await;
        self.settle_profile(&ticket, result, "Account created successfully")
    }

    /// Clears the session once the backend confirms it.
    ///
    /// # Errors
    /// Returns the backend or transport error. The profile and mirror are kept in
    /// that case, since the backend session may still be live.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let ticket = self.begin(false);
        match self.api.sign_out().await {
            Ok(()) => {
                if !ticket.apply(None) {
                    return Err(AuthError::Superseded);
                }
                self.navigator.navigate(SIGN_IN_PATH);
                self.notifier.success("Signed out successfully");
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Ask the backend to send reset instructions. Does not touch the session.
    ///
    /// # Errors
    /// Returns the backend or transport error.
    #[instrument(skip(self, email))]
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        match self.api.reset_password(email).await {
            Ok(message) => {
                self.notifier.success(
                    message
                        .as_deref()
                        .unwrap_or("Password reset instructions sent"),
                );
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn settle_profile(
        &self,
        ticket: &Ticket<'_>,
        result: Result<UserProfile, AuthError>,
        success: &str,
    ) -> Result<UserProfile, AuthError> {
        match result {
            Ok(profile) => {
                if !ticket.apply(Some(profile.clone())) {
                    return Err(AuthError::Superseded);
                }
                self.notifier.success(success);
                Ok(profile)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&self, err: AuthError) -> AuthError {
        self.notifier.error(&err.to_string());
        err
    }

    fn begin(&self, check: bool) -> Ticket<'_> {
        let mut state = self.write_state();
        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        state.live.insert(id);
        if check {
            state.checks += 1;
            state.loading = true;
        }
        Ticket {
            store: self,
            id,
            check,
        }
    }

    /// Install `profile` unless a newer operation has applied or is still live.
    /// The in-memory profile is set before the mirror is written.
    fn apply(&self, ticket: u64, profile: Option<UserProfile>) -> bool {
        let mut state = self.write_state();
        state.live.remove(&ticket);
        if state.is_stale(ticket) {
            debug!(ticket, applied = state.applied, "discarding stale session result");
            return false;
        }

        state.applied = ticket;
        state.profile = profile;
        state.loading = false;
        match &state.profile {
            Some(profile) => cache::write_profile(self.cache.as_ref(), profile, ticket),
            None => cache::clear_profile(self.cache.as_ref()),
        }
        true
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("SessionStore")
            .field("signed_in", &state.profile.is_some())
            .field("loading", &state.loading)
            .field("checks", &state.checks)
            .field("applied", &state.applied)
            .finish_non_exhaustive()
    }
}
