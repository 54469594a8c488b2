//! Password policy for registration.

use serde::Serialize;

/// Special characters accepted (and one of which is required).
pub const SPECIAL_CHARACTERS: &str = "@$!%*?&";

/// Minimum password length.
pub const MIN_LENGTH: usize = 8;

/// A single rule of the password policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordRequirement {
    /// [`MIN_LENGTH`] characters or more
    MinLength,
    /// An ASCII uppercase letter
    Uppercase,
    /// An ASCII lowercase letter
    Lowercase,
    /// An ASCII digit
    Digit,
    /// One of [`SPECIAL_CHARACTERS`]
    Special,
    /// Nothing outside letters, digits and [`SPECIAL_CHARACTERS`]
    AllowedCharacters,
}

impl PasswordRequirement {
    /// Every rule, in display order.
    pub const ALL: [PasswordRequirement; 6] = [
        PasswordRequirement::MinLength,
        PasswordRequirement::Uppercase,
        PasswordRequirement::Lowercase,
        PasswordRequirement::Digit,
        PasswordRequirement::Special,
        PasswordRequirement::AllowedCharacters,
    ];

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            PasswordRequirement::MinLength => "At least 8 characters",
            PasswordRequirement::Uppercase => "At least one uppercase letter",
            PasswordRequirement::Lowercase => "At least one lowercase letter",
            PasswordRequirement::Digit => "At least one number",
            PasswordRequirement::Special => "At least one special character (@$!%*?&)",
            PasswordRequirement::AllowedCharacters => {
                "Only letters, numbers and the special characters @$!%*?&"
            }
        }
    }

    /// Whether `password` satisfies this rule.
    pub fn is_met(self, password: &str) -> bool {
        match self {
            PasswordRequirement::MinLength => password.chars().count() >= MIN_LENGTH,
            PasswordRequirement::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            PasswordRequirement::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            PasswordRequirement::Digit => password.chars().any(|c| c.is_ascii_digit()),
            PasswordRequirement::Special => password.chars().any(is_special),
            PasswordRequirement::AllowedCharacters => password
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || is_special(c)),
        }
    }
}

impl std::fmt::Display for PasswordRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

fn is_special(c: char) -> bool {
    SPECIAL_CHARACTERS.contains(c)
}

/// Rules `password` does not meet; empty means acceptable.
pub fn unmet_requirements(password: &str) -> Vec<PasswordRequirement> {
    PasswordRequirement::ALL
        .into_iter()
        .filter(|req| !req.is_met(password))
        .collect()
}

/// `true` if every rule is met.
pub fn is_valid_password(password: &str) -> bool {
    unmet_requirements(password).is_empty()
}
