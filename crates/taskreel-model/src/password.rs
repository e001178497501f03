// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};

const PUNCTUATION: &str = "!@#$%^&*(),.?\":{}|<>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl Display for PasswordStrength {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Weak => "Weak",
            Self::Medium => "Medium",
            Self::Strong => "Strong",
        })
    }
}

/// Classifies a candidate password by length and character-class coverage:
/// Strong needs length >= 8 and all four classes (lower, upper, digit,
/// punctuation); Medium needs length >= 6 and at least two classes.
#[must_use]
pub fn evaluate_password_strength(password: &str) -> PasswordStrength {
    let classes: [fn(char) -> bool; 4] = [
        |c| c.is_ascii_lowercase(),
        |c| c.is_ascii_uppercase(),
        |c| c.is_ascii_digit(),
        |c| PUNCTUATION.contains(c),
    ];
    let passed = classes
        .iter()
        .filter(|class| password.chars().any(|c| class(c)))
        .count();

    if password.len() >= 8 && passed == 4 {
        PasswordStrength::Strong
    } else if password.len() >= 6 && passed >= 2 {
        PasswordStrength::Medium
    } else {
        PasswordStrength::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_requires_all_four_classes_and_length() {
        assert_eq!(
            evaluate_password_strength("Str0ng!Pass"),
            PasswordStrength::Strong
        );
        assert_eq!(
            evaluate_password_strength("Aa1!Aa1!"),
            PasswordStrength::Strong
        );
        // Three classes at length 8 is only Medium.
        assert_eq!(
            evaluate_password_strength("Aa1aaa1a"),
            PasswordStrength::Medium
        );
        // All four classes but too short.
        assert_eq!(evaluate_password_strength("Aa1!"), PasswordStrength::Weak);
    }

    #[test]
    fn medium_requires_two_classes_and_length_six() {
        assert_eq!(
            evaluate_password_strength("abc123"),
            PasswordStrength::Medium
        );
        assert_eq!(evaluate_password_strength("abcdef"), PasswordStrength::Weak);
        assert_eq!(evaluate_password_strength("ab1"), PasswordStrength::Weak);
    }

    #[test]
    fn empty_password_is_weak() {
        assert_eq!(evaluate_password_strength(""), PasswordStrength::Weak);
    }
}
