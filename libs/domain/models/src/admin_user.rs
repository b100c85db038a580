// [libs/domain/models/src/admin_user.rs]
/*!
 * MODULE: ADMIN USER & PASSWORD POLICY
 * LAYER: DOMAIN MODEL (L2)
 * RESPONSIBILITY: ADMIN IDENTITY SHAPE AND PASSWORD RULE ENFORCEMENT
 *
 * The password policy lives here rather than in the auth service because
 * it is pure and needs no database or token context — every call site
 * (create, change, reset) reuses this one evaluator.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Editor,
    Viewer,
}

impl AdminRole {
    /// Default permission set granted by role membership alone.
    pub fn default_permissions(&self) -> HashSet<String> {
        let perms: &[&str] = match self {
            AdminRole::SuperAdmin => &["*"],
            AdminRole::Admin => &[
                "create:users",
                "update:users",
                "delete:users",
                "read:users",
                "manage:sync",
                "manage:rate-limits",
                "manage:ip-blocking",
                "manage:jobs",
                "read:analytics",
            ],
            AdminRole::Editor => &["manage:sync", "read:analytics", "read:users"],
            AdminRole::Viewer => &["read:analytics", "read:users"],
        };
        perms.iter().map(|s| s.to_string()).collect()
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::Admin => "admin",
            AdminRole::Editor => "editor",
            AdminRole::Viewer => "viewer",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "super_admin" => Ok(AdminRole::SuperAdmin),
            "admin" => Ok(AdminRole::Admin),
            "editor" => Ok(AdminRole::Editor),
            "viewer" => Ok(AdminRole::Viewer),
            other => Err(format!("unknown admin role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: AdminRole,
    pub permissions: HashSet<String>,
    pub active: bool,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
    /// `jti` of the refresh token currently honored for this user, if any.
    #[serde(skip_serializing)]
    pub current_refresh_token_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AdminUser {
    /// `super_admin` holds every permission regardless of the stored set.
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.role == AdminRole::SuperAdmin {
            return true;
        }
        self.permissions.contains(permission) || self.permissions.contains("*")
    }

    pub fn effective_permissions(&self) -> HashSet<String> {
        if self.role == AdminRole::SuperAdmin {
            return ["*".to_string()].into_iter().collect();
        }
        self.permissions
            .union(&self.role.default_permissions())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordPolicyError {
    TooShort,
    TooLong,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial,
    RepeatedCharacterRun,
    SequentialRun,
    CommonPassword,
}

impl PasswordPolicyError {
    pub fn message(&self) -> &'static str {
        match self {
            PasswordPolicyError::TooShort => "password must be at least 8 characters",
            PasswordPolicyError::TooLong => "password must be at most 128 characters",
            PasswordPolicyError::MissingUppercase => "password must contain at least one uppercase letter",
            PasswordPolicyError::MissingLowercase => "password must contain at least one lowercase letter",
            PasswordPolicyError::MissingDigit => "password must contain at least one digit",
            PasswordPolicyError::MissingSpecial => "password must contain at least one special character",
            PasswordPolicyError::RepeatedCharacterRun => "password must not repeat the same character more than twice in a row",
            PasswordPolicyError::SequentialRun => "password must not contain 3 or more sequential letters or digits",
            PasswordPolicyError::CommonPassword => "password is too common",
        }
    }
}

const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "123456",
    "123456789",
    "qwerty",
    "abc123",
    "password123",
    "admin",
    "letmein",
    "welcome",
    "monkey",
    "dragon",
    "master",
];

/// Full list of requirements surfaced to clients via
/// `GET /auth/password-requirements`.
pub fn password_requirements() -> Vec<&'static str> {
    vec![
        "At least 8 characters, at most 128",
        "At least one uppercase letter",
        "At least one lowercase letter",
        "At least one digit",
        "At least one special character (!@#$%^&*()_+-=[]{}|;:,.<>?)",
        "No more than 2 identical characters in a row",
        "No 3+ sequential ascending letters or digits (e.g. abc, 123)",
        "Must not be a commonly used password",
    ]
}

/// Evaluates every rule and returns every violation rather than
/// short-circuiting, so callers can report the full list at once.
pub fn validate_password(password: &str) -> Result<(), Vec<PasswordPolicyError>> {
    let mut violations = Vec::new();

    if password.chars().count() < 8 {
        violations.push(PasswordPolicyError::TooShort);
    }
    if password.chars().count() > 128 {
        violations.push(PasswordPolicyError::TooLong);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push(PasswordPolicyError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push(PasswordPolicyError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(PasswordPolicyError::MissingDigit);
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        violations.push(PasswordPolicyError::MissingSpecial);
    }
    if has_repeated_run(password) {
        violations.push(PasswordPolicyError::RepeatedCharacterRun);
    }
    if has_sequential_run(password) {
        violations.push(PasswordPolicyError::SequentialRun);
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        violations.push(PasswordPolicyError::CommonPassword);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// More than 2 identical characters in a row (i.e. a run of 3+).
fn has_repeated_run(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

/// 3 sequential ascending letters or digits, case-insensitive for letters.
fn has_sequential_run(password: &str) -> bool {
    let normalized: Vec<char> = password.to_ascii_lowercase().chars().collect();
    normalized.windows(3).any(|w| {
        let (a, b, c) = (w[0] as i32, w[1] as i32, w[2] as i32);
        let ascending = b == a + 1 && c == b + 1;
        let all_digits = w.iter().all(|ch| ch.is_ascii_digit());
        let all_letters = w.iter().all(|ch| ch.is_ascii_lowercase());
        ascending && (all_digits || all_letters)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_password() {
        let result = validate_password("Sh0rt!");
        assert_eq!(result.unwrap_err(), vec![PasswordPolicyError::TooShort]);
    }

    #[test]
    fn accepts_minimum_length() {
        assert!(validate_password("Str0ng!zx").is_ok());
    }

    #[test]
    fn rejects_sequential_digits() {
        let violations = validate_password("Abcdef123!").unwrap_err();
        assert!(violations.contains(&PasswordPolicyError::SequentialRun));
    }

    #[test]
    fn rejects_sequential_letters_case_insensitive() {
        let violations = validate_password("xyZaBc99!!").unwrap_err();
        assert!(violations.contains(&PasswordPolicyError::SequentialRun));
    }

    #[test]
    fn allows_descending_sequence() {
        assert!(validate_password("Cba9876!z").is_ok());
    }

    #[test]
    fn rejects_repeated_run() {
        let violations = validate_password("Aaa12345!").unwrap_err();
        assert!(violations.contains(&PasswordPolicyError::RepeatedCharacterRun));
    }

    #[test]
    fn rejects_common_password() {
        let violations = validate_password("password").unwrap_err();
        assert!(violations.contains(&PasswordPolicyError::CommonPassword));
    }

    #[test]
    fn super_admin_has_every_permission() {
        let user = AdminUser {
            id: "u1".into(),
            email: "a@b.test".into(),
            password_hash: "x".into(),
            first_name: None,
            last_name: None,
            role: AdminRole::SuperAdmin,
            permissions: HashSet::new(),
            active: true,
            last_login_at: None,
            current_refresh_token_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(user.has_permission("delete:users"));
        assert!(user.has_permission("anything:at-all"));
    }
}
