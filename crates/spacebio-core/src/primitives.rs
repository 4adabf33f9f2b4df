//! # Primitives
//!
//! Hardcoded constants for the SpaceBio core.
//!
//! These values are compiled into the binary and immutable at runtime.
//! Configuration may override the action delays and timeouts, never the
//! validation limits.

// =============================================================================
// SIMULATED LATENCY
// =============================================================================

/// Simulated latency of the citation export action.
pub const CITATION_DELAY_MS: u64 = 1000;

/// Simulated latency of the record export action.
pub const EXPORT_DELAY_MS: u64 = 1500;

/// Simulated latency of the share action.
pub const SHARE_DELAY_MS: u64 = 800;

/// Simulated latency of the dataset download action.
pub const DOWNLOAD_DELAY_MS: u64 = 2000;

/// Upper bound for any single action before it is reported as failed.
pub const ACTION_TIMEOUT_MS: u64 = 10_000;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Minimum password length accepted by the identity platform.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum length of a personal name in the registration form.
pub const MIN_NAME_LENGTH: usize = 2;

/// Consecutive failed sign-ins before an account is throttled.
pub const MAX_FAILED_LOGINS: u32 = 5;

/// Live sessions kept per account; a sign-in past this ends the oldest.
pub const MAX_SESSIONS_PER_ACCOUNT: usize = 5;

/// Maximum length of free-text search input.
///
/// Longer queries are rejected at the API boundary.
pub const MAX_QUERY_LENGTH: usize = 512;

/// Maximum size of a catalog file loaded from disk (16 MB).
pub const MAX_CATALOG_FILE_SIZE: u64 = 16 * 1024 * 1024;

// =============================================================================
// IDENTITY PLATFORM
// =============================================================================

/// Document collection holding user profiles on the identity platform.
pub const USERS_COLLECTION: &str = "users";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_fit_within_timeout() {
        for delay in [
            CITATION_DELAY_MS,
            EXPORT_DELAY_MS,
            SHARE_DELAY_MS,
            DOWNLOAD_DELAY_MS,
        ] {
            assert!(delay < ACTION_TIMEOUT_MS);
        }
    }
}
