//! # Auth Session
//!
//! Explicitly owned authentication state with a single writer.
//!
//! ```text
//!   AuthClient ──owns──▶ SessionWriter ──┐
//!                                        ├──▶ shared AuthSnapshot + listeners
//!   views ──hold──▶ SessionReader (Clone)┘
//! ```
//!
//! Only the [`SessionWriter`] can change the snapshot, and it cannot be
//! cloned. Readers observe the snapshot or subscribe to changes; listeners
//! run synchronously after each change, outside the lock.

use crate::identity::{AuthError, IdentityPlatform, IdentityService, SignedIn};
use crate::profile::{ProfileUpdate, Registration, UserProfile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Observable authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSnapshot {
    /// True until the first auth resolution, and while a login or
    /// registration is in flight.
    pub loading: bool,
    pub user: Option<UserProfile>,
    pub error: Option<String>,
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self {
            loading: true,
            user: None,
            error: None,
        }
    }
}

impl AuthSnapshot {
    /// The snapshot once a profile lookup has finished.
    #[must_use]
    pub fn settled(lookup: &Result<UserProfile, AuthError>) -> Self {
        match lookup {
            Ok(user) => Self {
                loading: false,
                user: Some(user.clone()),
                error: None,
            },
            Err(e) => Self {
                loading: false,
                user: None,
                error: Some(e.user_message()),
            },
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

type Listener = Arc<dyn Fn(&AuthSnapshot) + Send + Sync>;

#[derive(Default)]
struct Shared {
    snapshot: AuthSnapshot,
    listeners: BTreeMap<u64, Listener>,
    next_listener: u64,
}

type SharedHandle = Arc<RwLock<Shared>>;

// =============================================================================
// WRITER / READER
// =============================================================================

/// The single writer of an auth session.
pub struct SessionWriter {
    shared: SharedHandle,
}

/// A read handle on an auth session.
#[derive(Clone)]
pub struct SessionReader {
    shared: SharedHandle,
}

/// Create a session in the initial loading state.
#[must_use]
pub fn new_session() -> (SessionWriter, SessionReader) {
    let shared: SharedHandle = Arc::default();
    (
        SessionWriter {
            shared: Arc::clone(&shared),
        },
        SessionReader { shared },
    )
}

impl SessionWriter {
    #[must_use]
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Apply `change` and notify every listener with the new snapshot.
    fn update(&self, change: impl FnOnce(&mut AuthSnapshot)) {
        let (snapshot, listeners) = {
            let mut shared = self.shared.write().unwrap_or_else(PoisonError::into_inner);
            change(&mut shared.snapshot);
            let listeners: Vec<Listener> = shared.listeners.values().cloned().collect();
            (shared.snapshot.clone(), listeners)
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// A login or registration started: loading, previous error cleared.
    pub fn begin(&self) {
        self.update(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    pub fn signed_in(&self, user: UserProfile) {
        self.update(|s| {
            s.loading = false;
            s.user = Some(user);
            s.error = None;
        });
    }

    pub fn signed_out(&self) {
        self.update(|s| {
            s.loading = false;
            s.user = None;
        });
    }

    /// Record a failure for display. The user, if any, is kept.
    pub fn failed(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|s| {
            s.loading = false;
            s.error = Some(message);
        });
    }

    pub fn clear_error(&self) {
        self.update(|s| s.error = None);
    }
}

impl SessionReader {
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .is_authenticated()
    }

    /// Run `callback` after every state change until the returned
    /// [`Subscription`] is dropped.
    pub fn on_auth_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthSnapshot) + Send + Sync + 'static,
    {
        let mut shared = self.shared.write().unwrap_or_else(PoisonError::into_inner);
        let id = shared.next_listener;
        shared.next_listener += 1;
        shared.listeners.insert(id, Arc::new(callback));
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }
}

/// Keeps a listener registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    shared: Weak<RwLock<Shared>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&self.id);
        }
    }
}

// =============================================================================
// PROFILE GATE
// =============================================================================

/// What the profile view renders for a snapshot.
///
/// Loading always wins: the redirect happens only once auth has resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileGate {
    Loading,
    RedirectToSignIn,
    Show,
}

impl ProfileGate {
    #[must_use]
    pub fn evaluate(snapshot: &AuthSnapshot) -> Self {
        if snapshot.loading {
            Self::Loading
        } else if snapshot.user.is_none() {
            Self::RedirectToSignIn
        } else {
            Self::Show
        }
    }
}

// =============================================================================
// AUTH CLIENT
// =============================================================================

/// One user's view of the identity service: owns the session writer and
/// the session token.
pub struct AuthClient<P> {
    service: IdentityService<P>,
    writer: SessionWriter,
    token: Option<String>,
}

impl<P: IdentityPlatform> AuthClient<P> {
    pub fn new(service: IdentityService<P>) -> Self {
        let (writer, _) = new_session();
        Self {
            service,
            writer,
            token: None,
        }
    }

    pub fn reader(&self) -> SessionReader {
        self.writer.reader()
    }

    pub fn service(&self) -> &IdentityService<P> {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut IdentityService<P> {
        &mut self.service
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Resolve the initial loading state from a cached token.
    pub fn restore(&mut self, token: Option<String>) {
        let profile = token
            .as_deref()
            .and_then(|t| self.service.profile(t).ok());
        match profile {
            Some(profile) => {
                self.token = token;
                self.writer.signed_in(profile);
            }
            None => {
                self.token = None;
                self.writer.signed_out();
            }
        }
    }

    fn finish(&mut self, result: Result<SignedIn, AuthError>) -> Result<UserProfile, AuthError> {
        match result {
            Ok(signed_in) => {
                self.token = Some(signed_in.token);
                self.writer.signed_in(signed_in.profile.clone());
                Ok(signed_in.profile)
            }
            Err(e) => {
                self.writer.failed(e.user_message());
                Err(e)
            }
        }
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        self.writer.begin();
        let result = self.service.login(email, password);
        self.finish(result)
    }

    pub fn register(&mut self, registration: &Registration) -> Result<UserProfile, AuthError> {
        self.writer.begin();
        let result = self.service.register(registration);
        self.finish(result)
    }

    /// Sign out locally even if the platform call fails.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        let result = match self.token.take() {
            Some(token) => self.service.logout(&token),
            None => Ok(()),
        };
        self.writer.signed_out();
        result
    }

    pub fn update_profile(&mut self, update: &ProfileUpdate) -> Result<UserProfile, AuthError> {
        let token = self.token.clone().ok_or(AuthError::NotAuthenticated)?;
        match self.service.update_profile(&token, update) {
            Ok(profile) => {
                self.writer.signed_in(profile.clone());
                Ok(profile)
            }
            Err(e) => {
                self.writer.failed(e.user_message());
                Err(e)
            }
        }
    }

    pub fn clear_error(&self) {
        self.writer.clear_error();
    }
}
