//! # Profile Utilities
//!
//! The user profile document plus the helpers the profile and sign-up
//! views need: display names, avatar initials, research-area labels,
//! registration form validation and password strength.

use crate::primitives::{MIN_NAME_LENGTH, MIN_PASSWORD_LENGTH};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role assigned to every self-registered account.
pub const DEFAULT_ROLE: &str = "scientist";

/// Characters counted as "special" by [`password_strength`].
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

// =============================================================================
// USER PROFILE
// =============================================================================

/// Profile document stored under `users/<uid>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub research_area: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub profile_complete: bool,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

impl UserProfile {
    /// Profile for a freshly registered account.
    #[must_use]
    pub fn new_registration(uid: impl Into<String>, form: &Registration, now: DateTime<Utc>) -> Self {
        Self {
            uid: uid.into(),
            email: form.email.clone(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            institution: form.institution.clone(),
            research_area: form.research_area.clone(),
            role: default_role(),
            created_at: now,
            last_login: now,
            updated_at: None,
            profile_complete: true,
        }
    }

    /// "First Last", falling back to the email, then to "User".
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if !name.is_empty() {
            name.to_string()
        } else if !self.email.is_empty() {
            self.email.clone()
        } else {
            "User".to_string()
        }
    }

    /// Avatar initials: both name initials, else the first name's, else the
    /// email's first letter, else "U".
    #[must_use]
    pub fn initials(&self) -> String {
        let first = self.first_name.trim().chars().next();
        let last = self.last_name.trim().chars().next();
        let email = self.email.trim().chars().next();

        let letters: Vec<char> = match (first, last, email) {
            (Some(f), Some(l), _) => vec![f, l],
            (Some(f), None, _) => vec![f],
            (None, _, Some(e)) => vec![e],
            (None, _, None) => vec!['U'],
        };
        letters.into_iter().flat_map(char::to_uppercase).collect()
    }
}

/// "space-biology" becomes "Space Biology"; empty becomes "Not specified".
#[must_use]
pub fn format_research_area(area: &str) -> String {
    if area.is_empty() {
        return "Not specified".to_string();
    }
    let mut out = String::with_capacity(area.len());
    let mut at_word_start = true;
    for ch in area.chars() {
        let ch = if ch == '-' { ' ' } else { ch };
        let is_word = ch.is_alphanumeric() || ch == '_';
        if is_word && at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !is_word;
    }
    out
}

// =============================================================================
// VALIDATION
// =============================================================================

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot in the
/// domain with text on both sides.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Form fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Password,
    ConfirmPassword,
    Institution,
}

impl FormField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Institution => "institution",
        }
    }
}

pub type FieldErrors = BTreeMap<FormField, &'static str>;

/// Validated sign-up payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub research_area: String,
}

/// The sign-up form as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub institution: String,
    pub research_area: String,
}

impl RegistrationForm {
    /// One message per invalid field; empty means the form can be submitted.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.first_name.trim().is_empty() {
            errors.insert(FormField::FirstName, "First name is required");
        }
        if self.last_name.trim().is_empty() {
            errors.insert(FormField::LastName, "Last name is required");
        }

        if self.email.trim().is_empty() {
            errors.insert(FormField::Email, "Email is required");
        } else if !is_valid_email(self.email.trim()) {
            errors.insert(FormField::Email, "Please enter a valid email address");
        }

        if self.password.is_empty() {
            errors.insert(FormField::Password, "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.insert(
                FormField::Password,
                "Password must be at least 6 characters long",
            );
        }

        if self.confirm_password.is_empty() {
            errors.insert(FormField::ConfirmPassword, "Please confirm your password");
        } else if self.password != self.confirm_password {
            errors.insert(FormField::ConfirmPassword, "Passwords do not match");
        }

        errors
    }

    /// Validate and convert into the payload sent to the identity platform.
    pub fn into_registration(self) -> Result<Registration, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Registration {
            email: self.email.trim().to_string(),
            password: self.password,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            institution: self.institution.trim().to_string(),
            research_area: self.research_area,
        })
    }
}

/// Partial profile edit; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_area: Option<String>,
}

impl ProfileUpdate {
    /// Names need two characters; the institution is optional but, when
    /// given, needs two characters too.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let too_short = |s: &str| s.trim().chars().count() < MIN_NAME_LENGTH;
        let mut errors = FieldErrors::new();

        if self.first_name.as_deref().is_some_and(too_short) {
            errors.insert(FormField::FirstName, "First name must be at least 2 characters");
        }
        if self.last_name.as_deref().is_some_and(too_short) {
            errors.insert(FormField::LastName, "Last name must be at least 2 characters");
        }
        if self
            .institution
            .as_deref()
            .is_some_and(|i| !i.trim().is_empty() && too_short(i))
        {
            errors.insert(
                FormField::Institution,
                "Institution must be at least 2 characters",
            );
        }
        errors
    }

    /// True when the edit touches the account's display name.
    #[must_use]
    pub fn changes_name(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some()
    }
}

// =============================================================================
// PASSWORD STRENGTH
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum StrengthLevel {
    #[serde(rename = "Very Weak")]
    VeryWeak,
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLevel {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Strong => "Strong",
        }
    }

    /// Level for a score of satisfied criteria; five out of five is Strong.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            0 => Self::VeryWeak,
            1 => Self::Weak,
            2 => Self::Fair,
            3 => Self::Good,
            _ => Self::Strong,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub level: StrengthLevel,
    pub feedback: Vec<&'static str>,
}

#[must_use]
pub fn password_strength(password: &str) -> PasswordStrength {
    let criteria: [(bool, &'static str); 5] = [
        (password.chars().count() >= 8, "Use at least 8 characters"),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "Include lowercase letters",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "Include uppercase letters",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "Include numbers",
        ),
        (
            password.chars().any(|c| SPECIAL_CHARS.contains(c)),
            "Include special characters",
        ),
    ];

    let mut score = 0u8;
    let mut feedback = Vec::new();
    for (met, hint) in criteria {
        if met {
            score += 1;
        } else {
            feedback.push(hint);
        }
    }

    PasswordStrength {
        score,
        level: StrengthLevel::from_score(score),
        feedback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: &str, last: &str, email: &str) -> UserProfile {
        let now = Utc::now();
        UserProfile {
            uid: "u1".into(),
            email: email.into(),
            first_name: first.into(),
            last_name: last.into(),
            institution: String::new(),
            research_area: String::new(),
            role: default_role(),
            created_at: now,
            last_login: now,
            updated_at: None,
            profile_complete: true,
        }
    }

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.org".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            ..RegistrationForm::default()
        }
    }

    #[test]
    fn display_name_fallbacks() {
        assert_eq!(profile(" Ada ", "Lovelace", "a@b.c").display_name(), "Ada Lovelace");
        assert_eq!(profile("", "", "a@b.c").display_name(), "a@b.c");
        assert_eq!(profile("", "", "").display_name(), "User");
    }

    #[test]
    fn initials_fallbacks() {
        assert_eq!(profile("ada", "lovelace", "").initials(), "AL");
        assert_eq!(profile("ada", "", "x@y.z").initials(), "A");
        assert_eq!(profile("", "Lovelace", "x@y.z").initials(), "X");
        assert_eq!(profile("", "", "").initials(), "U");
    }

    #[test]
    fn research_area_is_title_cased() {
        assert_eq!(format_research_area("space-biology"), "Space Biology");
        assert_eq!(format_research_area("radiation-biology"), "Radiation Biology");
        assert_eq!(format_research_area("astrobiology"), "Astrobiology");
        assert_eq!(format_research_area(""), "Not specified");
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ada@example.org"));
        assert!(is_valid_email("a@b.co.uk"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@.org"));
        assert!(!is_valid_email("ada@example."));
        assert!(!is_valid_email("a da@example.org"));
        assert!(!is_valid_email("a@b@c.org"));
        assert!(!is_valid_email("@example.org"));
    }

    #[test]
    fn valid_form_has_no_errors() {
        assert!(valid_form().validate().is_empty());
        let registration = valid_form().into_registration().expect("valid form");
        assert_eq!(registration.email, "ada@example.org");
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = RegistrationForm::default().validate();
        assert_eq!(errors.get(&FormField::FirstName), Some(&"First name is required"));
        assert_eq!(errors.get(&FormField::LastName), Some(&"Last name is required"));
        assert_eq!(errors.get(&FormField::Email), Some(&"Email is required"));
        assert_eq!(errors.get(&FormField::Password), Some(&"Password is required"));
        assert_eq!(
            errors.get(&FormField::ConfirmPassword),
            Some(&"Please confirm your password")
        );
    }

    #[test]
    fn short_and_mismatched_passwords() {
        let form = RegistrationForm {
            password: "abc".into(),
            confirm_password: "abd".into(),
            ..valid_form()
        };
        let errors = form.validate();
        assert_eq!(
            errors.get(&FormField::Password),
            Some(&"Password must be at least 6 characters long")
        );
        assert_eq!(
            errors.get(&FormField::ConfirmPassword),
            Some(&"Passwords do not match")
        );
    }

    #[test]
    fn profile_update_checks_lengths() {
        let update = ProfileUpdate {
            first_name: Some("A".into()),
            institution: Some(String::new()),
            ..ProfileUpdate::default()
        };
        let errors = update.validate();
        assert!(errors.contains_key(&FormField::FirstName));
        assert!(!errors.contains_key(&FormField::Institution));
        assert!(update.changes_name());
    }

    #[test]
    fn password_strength_levels() {
        let weak = password_strength("abc");
        assert_eq!(weak.score, 1);
        assert_eq!(weak.level, StrengthLevel::Weak);
        assert_eq!(weak.feedback.len(), 4);

        let strong = password_strength("Abcdef1!");
        assert_eq!(strong.score, 5);
        assert_eq!(strong.level, StrengthLevel::Strong);
        assert!(strong.feedback.is_empty());

        assert_eq!(password_strength("").level, StrengthLevel::VeryWeak);
    }

    #[test]
    fn profile_document_uses_camel_case() {
        let json = serde_json::to_value(profile("Ada", "L", "a@b.c")).expect("json");
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["role"], "scientist");
        assert!(json.get("updatedAt").is_none());
    }
}
