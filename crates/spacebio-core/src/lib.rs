//! # spacebio-core
//!
//! The deterministic search core for SpaceBio - THE LOGIC.
//!
//! This crate holds everything behind the space-biology publication search
//! dashboard that does not need a runtime: the publication catalog, the
//! filter engine, facet and detail-overlay state, per-action status flags,
//! the detail tab view models, and the identity wrapper with its explicitly
//! owned auth session.
//!
//! ## Data Flow
//!
//! ```text
//!   input ─▶ FacetManager ─▶ FilterState ─▶ apply_filters(catalog) ─▶ view
//!                                                                    │
//!                                   DetailController ◀── select(id) ─┘
//! ```
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Filtering is pure: same inputs, same output, nothing mutated
//! - Category and mission identifiers are declared once, in `types`
//! - Never panics: every fallible operation returns a `Result`

// =============================================================================
// MODULES
// =============================================================================

pub mod actions;
pub mod catalog;
pub mod citation;
pub mod dataset;
pub mod detail;
pub mod facets;
pub mod filter;
pub mod identity;
pub mod knowledge;
pub mod primitives;
pub mod profile;
pub mod search;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Category, Mission, Record, RecordId, SpaceBioError, normalize_facet_id};

// =============================================================================
// RE-EXPORTS: Search
// =============================================================================

pub use catalog::{Catalog, FacetOption, FacetTable};
pub use facets::{ChipKind, FacetManager, FilterChip};
pub use filter::{DateRange, FilterState, apply_filters, parse_date_bound};
pub use search::{SearchPage, results_summary};

// =============================================================================
// RE-EXPORTS: Detail Overlay
// =============================================================================

pub use actions::{ActionBoard, ActionDelays, ActionKind, TaskStatus};
pub use citation::{CitationStyle, format_citation};
pub use dataset::{DatasetSheet, DownloadOption};
pub use detail::{ClickTarget, DetailController, DetailState, DetailTab};
pub use knowledge::{KnowledgeGraph, ResolvedRelationship};

// =============================================================================
// RE-EXPORTS: Identity
// =============================================================================

pub use identity::{AuthError, IdentityPlatform, IdentityService, MemoryPlatform, SignedIn};
pub use profile::{
    FieldErrors, FormField, PasswordStrength, ProfileUpdate, Registration, RegistrationForm,
    UserProfile, format_research_area, password_strength,
};
pub use session::{AuthClient, AuthSnapshot, ProfileGate, SessionReader, Subscription};
