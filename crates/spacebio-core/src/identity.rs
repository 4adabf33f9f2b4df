//! # Identity Wrapper
//!
//! Thin wrapper around a hosted identity/document platform.
//!
//! The platform issues credentials and stores documents; this crate never
//! persists credentials itself. [`IdentityPlatform`] is the seam to that
//! service, [`MemoryPlatform`] an in-process stand-in with the same error
//! behaviour, and [`IdentityService`] the wrapper the views talk to: it
//! combines platform calls into login/registration/profile flows and builds
//! the merged [`UserProfile`].
//!
//! ## Error Mapping
//!
//! Every platform failure is an [`AuthError`] with a stable code and one
//! fixed user-facing message. Failures are never retried.

use crate::primitives::{
    MAX_FAILED_LOGINS, MAX_SESSIONS_PER_ACCOUNT, MIN_PASSWORD_LENGTH, USERS_COLLECTION,
};
use crate::profile::{ProfileUpdate, Registration, UserProfile, is_valid_email};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

// =============================================================================
// ERRORS
// =============================================================================

/// Failures reported by the identity platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No account found with this email address.")]
    UserNotFound,
    #[error("Incorrect password. Please try again.")]
    WrongPassword,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("This account has been disabled. Please contact support.")]
    UserDisabled,
    #[error("An account with this email already exists.")]
    EmailAlreadyInUse,
    #[error("Password should be at least 6 characters long.")]
    WeakPassword,
    #[error("Email/password accounts are not enabled. Please contact support.")]
    OperationNotAllowed,
    #[error("Invalid email or password. Please check your credentials.")]
    InvalidCredential,
    #[error("Too many failed attempts. Please try again later.")]
    TooManyRequests,
    #[error("Network error. Please check your internet connection.")]
    NetworkRequestFailed,
    #[error("You must be signed in to do that.")]
    NotAuthenticated,
    #[error("User profile not found")]
    DocumentNotFound,
    /// Anything the platform reports that has no dedicated code.
    #[error("An unexpected error occurred. Please try again.")]
    Internal(String),
}

impl AuthError {
    /// Stable platform error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidEmail => "auth/invalid-email",
            Self::UserDisabled => "auth/user-disabled",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::NotAuthenticated => "auth/not-authenticated",
            Self::DocumentNotFound => "document/not-found",
            Self::Internal(_) => "auth/internal-error",
        }
    }

    /// The message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

// =============================================================================
// PLATFORM SEAM
// =============================================================================

/// Account as known to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_sign_in: DateTime<Utc>,
}

/// A signed-in platform session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSession {
    pub token: String,
    pub account: AccountInfo,
}

/// Operations consumed from the hosted identity/document platform.
pub trait IdentityPlatform {
    fn login(&mut self, email: &str, password: &str) -> Result<PlatformSession, AuthError>;

    fn register(&mut self, email: &str, password: &str) -> Result<PlatformSession, AuthError>;

    fn update_display_name(&mut self, uid: &str, display_name: &str) -> Result<(), AuthError>;

    /// End a session. Unknown tokens are already signed out.
    fn logout(&mut self, token: &str) -> Result<(), AuthError>;

    /// The account behind a session token.
    fn current_user(&self, token: &str) -> Result<AccountInfo, AuthError>;

    fn send_password_reset(&mut self, email: &str) -> Result<(), AuthError>;

    fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, AuthError>;

    /// Create or replace a document.
    fn set_document(&mut self, collection: &str, id: &str, doc: Document) -> Result<(), AuthError>;

    /// Merge fields into an existing document.
    fn update_document(
        &mut self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), AuthError>;
}

// =============================================================================
// IN-MEMORY PLATFORM
// =============================================================================

#[derive(Debug, Clone)]
struct Account {
    info: AccountInfo,
    password_digest: [u8; 32],
    disabled: bool,
    failed_logins: u32,
}

fn password_digest(uid: &str, password: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(uid.as_bytes());
    hasher.update(&[0]);
    hasher.update(password.as_bytes());
    *hasher.finalize().as_bytes()
}

/// A live session: the owning account key and its issue order.
#[derive(Debug, Clone)]
struct Session {
    key: String,
    issued: u64,
}

/// In-process stand-in for the hosted platform.
///
/// Accounts are keyed by lower-cased email. Passwords are kept only as
/// salted digests and compared in constant time. Each account holds at most
/// [`MAX_SESSIONS_PER_ACCOUNT`] sessions; signing in past that ends the
/// oldest one.
#[derive(Debug, Clone)]
pub struct MemoryPlatform {
    accounts: BTreeMap<String, Account>,
    sessions: BTreeMap<String, Session>,
    next_session: u64,
    documents: BTreeMap<(String, String), Document>,
    password_resets: Vec<String>,
    email_password_enabled: bool,
    offline: bool,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
            sessions: BTreeMap::new(),
            next_session: 0,
            documents: BTreeMap::new(),
            password_resets: Vec::new(),
            email_password_enabled: true,
            offline: false,
        }
    }

    /// Disable an account; its sign-ins and sessions are refused.
    pub fn disable_account(&mut self, email: &str) -> Result<(), AuthError> {
        let account = self
            .accounts
            .get_mut(&email.to_lowercase())
            .ok_or(AuthError::UserNotFound)?;
        account.disabled = true;
        Ok(())
    }

    /// Toggle the email/password sign-up provider.
    pub fn set_email_password_enabled(&mut self, enabled: bool) {
        self.email_password_enabled = enabled;
    }

    /// Simulate losing the connection to the platform.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Emails a password reset was sent to, oldest first.
    #[must_use]
    pub fn password_resets(&self) -> &[String] {
        &self.password_resets
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn online(&self) -> Result<(), AuthError> {
        if self.offline {
            Err(AuthError::NetworkRequestFailed)
        } else {
            Ok(())
        }
    }

    fn issue_session(&mut self, key: &str) -> Result<PlatformSession, AuthError> {
        let account = self
            .accounts
            .get(key)
            .ok_or_else(|| AuthError::Internal(format!("account vanished: {key}")))?;
        let info = account.info.clone();

        let mut owned: Vec<(u64, String)> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.key == key)
            .map(|(token, s)| (s.issued, token.clone()))
            .collect();
        owned.sort_unstable();
        let excess = (owned.len() + 1).saturating_sub(MAX_SESSIONS_PER_ACCOUNT);
        for (_, token) in owned.into_iter().take(excess) {
            self.sessions.remove(&token);
        }

        let token = Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                key: key.to_string(),
                issued: self.next_session,
            },
        );
        self.next_session += 1;
        Ok(PlatformSession {
            token,
            account: info,
        })
    }

    fn account_by_uid_mut(&mut self, uid: &str) -> Option<&mut Account> {
        self.accounts.values_mut().find(|a| a.info.uid == uid)
    }
}

impl IdentityPlatform for MemoryPlatform {
    fn login(&mut self, email: &str, password: &str) -> Result<PlatformSession, AuthError> {
        self.online()?;
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        let key = email.to_lowercase();
        let account = self.accounts.get_mut(&key).ok_or(AuthError::UserNotFound)?;
        if account.disabled {
            return Err(AuthError::UserDisabled);
        }
        if account.failed_logins >= MAX_FAILED_LOGINS {
            return Err(AuthError::TooManyRequests);
        }

        let candidate = password_digest(&account.info.uid, password);
        let matches: bool = candidate[..].ct_eq(&account.password_digest[..]).into();
        if !matches {
            account.failed_logins += 1;
            return Err(AuthError::WrongPassword);
        }

        account.failed_logins = 0;
        account.info.last_sign_in = Utc::now();
        self.issue_session(&key)
    }

    fn register(&mut self, email: &str, password: &str) -> Result<PlatformSession, AuthError> {
        self.online()?;
        if !self.email_password_enabled {
            return Err(AuthError::OperationNotAllowed);
        }
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }
        let key = email.to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let uid = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let account = Account {
            password_digest: password_digest(&uid, password),
            info: AccountInfo {
                uid,
                email: email.to_string(),
                display_name: None,
                created_at: now,
                last_sign_in: now,
            },
            disabled: false,
            failed_logins: 0,
        };
        self.accounts.insert(key.clone(), account);
        self.issue_session(&key)
    }

    fn update_display_name(&mut self, uid: &str, display_name: &str) -> Result<(), AuthError> {
        self.online()?;
        let account = self
            .account_by_uid_mut(uid)
            .ok_or(AuthError::UserNotFound)?;
        account.info.display_name = Some(display_name.to_string()).filter(|n| !n.is_empty());
        Ok(())
    }

    fn logout(&mut self, token: &str) -> Result<(), AuthError> {
        self.sessions.remove(token);
        Ok(())
    }

    fn current_user(&self, token: &str) -> Result<AccountInfo, AuthError> {
        self.online()?;
        let session = self.sessions.get(token).ok_or(AuthError::NotAuthenticated)?;
        let account = self
            .accounts
            .get(&session.key)
            .ok_or(AuthError::NotAuthenticated)?;
        if account.disabled {
            return Err(AuthError::UserDisabled);
        }
        Ok(account.info.clone())
    }

    fn send_password_reset(&mut self, email: &str) -> Result<(), AuthError> {
        self.online()?;
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if !self.accounts.contains_key(&email.to_lowercase()) {
            return Err(AuthError::UserNotFound);
        }
        self.password_resets.push(email.to_string());
        Ok(())
    }

    fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, AuthError> {
        self.online()?;
        Ok(self
            .documents
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    fn set_document(&mut self, collection: &str, id: &str, doc: Document) -> Result<(), AuthError> {
        self.online()?;
        self.documents
            .insert((collection.to_string(), id.to_string()), doc);
        Ok(())
    }

    fn update_document(
        &mut self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), AuthError> {
        self.online()?;
        let doc = self
            .documents
            .get_mut(&(collection.to_string(), id.to_string()))
            .ok_or(AuthError::DocumentNotFound)?;
        doc.extend(fields);
        Ok(())
    }
}

// =============================================================================
// IDENTITY SERVICE
// =============================================================================

/// A successful sign-in: the session token and the merged profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub token: String,
    pub profile: UserProfile,
}

fn to_document<T: Serialize>(value: &T) -> Result<Document, AuthError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AuthError::Internal("document is not an object".into())),
        Err(e) => Err(AuthError::Internal(e.to_string())),
    }
}

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339())
}

/// Build the profile view of an account.
///
/// Defaults come from the account (names split from the display name); the
/// stored `users/<uid>` document overrides them field by field.
pub fn merge_profile(account: &AccountInfo, doc: Option<Document>) -> Result<UserProfile, AuthError> {
    let display = account.display_name.as_deref().unwrap_or_default();
    let (first, last) = display.split_once(' ').unwrap_or((display, ""));

    let mut merged = Document::new();
    merged.insert("uid".into(), account.uid.clone().into());
    merged.insert("email".into(), account.email.clone().into());
    merged.insert("firstName".into(), first.into());
    merged.insert("lastName".into(), last.into());
    merged.insert("createdAt".into(), timestamp(account.created_at));
    merged.insert("lastLogin".into(), timestamp(account.last_sign_in));
    if let Some(doc) = doc {
        merged.extend(doc);
    }
    // The account is authoritative for identity fields.
    merged.insert("uid".into(), account.uid.clone().into());

    serde_json::from_value(Value::Object(merged)).map_err(|e| AuthError::Internal(e.to_string()))
}

/// Login, registration and profile flows over an [`IdentityPlatform`].
///
/// Stateless apart from the platform: session tokens are handed back to the
/// caller, which owns them.
#[derive(Debug, Clone, Default)]
pub struct IdentityService<P> {
    platform: P,
}

impl<P: IdentityPlatform> IdentityService<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Create the account, name it and write its profile document.
    pub fn register(&mut self, registration: &Registration) -> Result<SignedIn, AuthError> {
        let session = self
            .platform
            .register(&registration.email, &registration.password)?;
        let uid = session.account.uid.clone();

        let display_name = format!("{} {}", registration.first_name, registration.last_name);
        let display_name = display_name.trim();
        if !display_name.is_empty() {
            self.platform.update_display_name(&uid, display_name)?;
        }

        let profile = UserProfile::new_registration(uid.as_str(), registration, Utc::now());
        self.platform
            .set_document(USERS_COLLECTION, &uid, to_document(&profile)?)?;

        Ok(SignedIn {
            token: session.token,
            profile,
        })
    }

    /// Sign in and stamp the profile's last login.
    pub fn login(&mut self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let session = self.platform.login(email.trim(), password)?;
        let uid = &session.account.uid;

        let mut stamp = Document::new();
        stamp.insert("lastLogin".into(), timestamp(Utc::now()));
        match self.platform.update_document(USERS_COLLECTION, uid, stamp) {
            Ok(()) | Err(AuthError::DocumentNotFound) => {}
            Err(e) => return Err(e),
        }

        let doc = self.platform.get_document(USERS_COLLECTION, uid)?;
        let profile = merge_profile(&session.account, doc)?;
        Ok(SignedIn {
            token: session.token,
            profile,
        })
    }

    pub fn logout(&mut self, token: &str) -> Result<(), AuthError> {
        self.platform.logout(token)
    }

    /// The merged profile of the session's account.
    pub fn profile(&self, token: &str) -> Result<UserProfile, AuthError> {
        let account = self.platform.current_user(token)?;
        let doc = self.platform.get_document(USERS_COLLECTION, &account.uid)?;
        merge_profile(&account, doc)
    }

    /// Merge an edit into the profile document and return the new profile.
    pub fn update_profile(
        &mut self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AuthError> {
        let account = self.platform.current_user(token)?;

        let mut fields = to_document(update)?;
        fields.insert("updatedAt".into(), timestamp(Utc::now()));
        self.platform
            .update_document(USERS_COLLECTION, &account.uid, fields)?;

        if update.changes_name() {
            let current = self.profile(token)?;
            let name = format!("{} {}", current.first_name, current.last_name);
            self.platform
                .update_display_name(&account.uid, name.trim())?;
        }

        self.profile(token)
    }

    pub fn forgot_password(&mut self, email: &str) -> Result<(), AuthError> {
        self.platform.send_password_reset(email.trim())
    }
}
