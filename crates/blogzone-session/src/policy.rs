//! Password strength policy.

use crate::SessionError;

/// The strength rule new passwords must meet.
///
/// The default matches the registration page: at least six characters,
/// with an ASCII uppercase letter, an ASCII lowercase letter, an ASCII
/// digit and one of `!@#$%^&*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in characters (not bytes).
    pub min_len: usize,

    /// At least one of these characters must appear.
    pub symbols: &'static str,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_len: 6,
            symbols: "!@#$%^&*",
        }
    }
}

impl PasswordPolicy {
    /// Returns `true` if `password` meets every rule.
    pub fn is_satisfied_by(&self, password: &str) -> bool {
        password.chars().count() >= self.min_len
            && password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_lowercase())
            && password.chars().any(|c| c.is_ascii_digit())
            && password.chars().any(|c| self.symbols.contains(c))
    }

    /// # Errors
    /// [`SessionError::WeakPassword`] if any rule is unmet.
    pub fn check(&self, password: &str) -> Result<(), SessionError> {
        if self.is_satisfied_by(password) {
            Ok(())
        } else {
            Err(SessionError::WeakPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PasswordPolicy {
        PasswordPolicy::default()
    }

    #[test]
    fn test_is_satisfied_by_minimal_strong_password() {
        assert!(policy().is_satisfied_by("Abc12!"));
    }

    #[test]
    fn test_is_satisfied_by_missing_each_rule_fails() {
        let p = policy();
        assert!(!p.is_satisfied_by("abc123"), "no upper, no symbol");
        assert!(!p.is_satisfied_by("Ab1!"), "too short");
        assert!(!p.is_satisfied_by("abcd1!"), "no upper");
        assert!(!p.is_satisfied_by("ABCD1!"), "no lower");
        assert!(!p.is_satisfied_by("Abcde!"), "no digit");
        assert!(!p.is_satisfied_by("Abcde1"), "no symbol");
        assert!(!p.is_satisfied_by("Abcd1?"), "symbol outside the set");
    }

    #[test]
    fn test_is_satisfied_by_counts_characters_not_bytes() {
        // Five characters, six bytes.
        assert!(!policy().is_satisfied_by("Ab1!é"));
        assert!(policy().is_satisfied_by("Ab1!éé"));
    }

    #[test]
    fn test_is_satisfied_by_non_ascii_letters_do_not_count() {
        assert!(!policy().is_satisfied_by("Ébcd1!"), "É is not ASCII uppercase");
        assert!(!policy().is_satisfied_by("BÇDÉ1!"), "Ç is not ASCII lowercase");
    }

    #[test]
    fn test_check_weak_returns_weak_password() {
        assert!(matches!(
            policy().check("abc123"),
            Err(SessionError::WeakPassword)
        ));
        assert!(policy().check("Abc12!").is_ok());
    }

    #[test]
    fn test_exhaustive_short_alphabet_matches_predicate() {
        // Every 6-char string over a tiny alphabet covering each class.
        let alphabet = ['a', 'B', '3', '!', '?'];
        let p = policy();
        let mut buf = [0usize; 6];
        loop {
            let candidate: String = buf.iter().map(|&i| alphabet[i]).collect();
            let expected = candidate.contains('a')
                && candidate.contains('B')
                && candidate.contains('3')
                && candidate.contains('!');
            assert_eq!(p.is_satisfied_by(&candidate), expected, "{candidate}");

            // Odometer increment.
            let mut pos = 0;
            loop {
                if pos == buf.len() {
                    return;
                }
                buf[pos] += 1;
                if buf[pos] < alphabet.len() {
                    break;
                }
                buf[pos] = 0;
                pos += 1;
            }
        }
    }
}
