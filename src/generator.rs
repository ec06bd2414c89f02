use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use tracing::debug;
use zeroize::Zeroizing;

pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const NUMBERS: &[u8] = b"0123456789";
pub const SPECIAL_CHARS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";
pub const SIMILAR_CHARS: &[u8] = b"il1Lo0O";

pub const DEFAULT_LENGTH: usize = 16;
pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    pub length: usize,
    pub include_uppercase: bool,
    pub include_lowercase: bool,
    pub include_numbers: bool,
    pub include_special_chars: bool,
    pub exclude_similar: bool,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_special_chars: true,
            exclude_similar: false,
        }
    }
}

impl PasswordConfig {
    pub fn class_alphabets(&self) -> Vec<Vec<u8>> {
        [
            (self.include_uppercase, UPPERCASE),
            (self.include_lowercase, LOWERCASE),
            (self.include_numbers, NUMBERS),
            (self.include_special_chars, SPECIAL_CHARS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, alphabet)| self.filter_similar(alphabet))
        .collect()
    }

    // Lowercase is the fallback when no class is enabled.
    pub fn charset(&self) -> Vec<u8> {
        let charset: Vec<u8> = self.class_alphabets().concat();
        if charset.is_empty() {
            self.filter_similar(LOWERCASE)
        } else {
            charset
        }
    }

    pub fn enabled_classes(&self) -> usize {
        [
            self.include_uppercase,
            self.include_lowercase,
            self.include_numbers,
            self.include_special_chars,
        ]
        .iter()
        .filter(|enabled| **enabled)
        .count()
    }

    fn filter_similar(&self, alphabet: &[u8]) -> Vec<u8> {
        if self.exclude_similar {
            alphabet
                .iter()
                .copied()
                .filter(|c| !SIMILAR_CHARS.contains(c))
                .collect()
        } else {
            alphabet.to_vec()
        }
    }
}

pub fn generate_password(config: &PasswordConfig) -> Zeroizing<String> {
    generate_password_with(config, &mut OsRng)
}

/// Output is `max(config.length, enabled classes)` characters long, with at
/// least one character from every enabled class.
pub fn generate_password_with<R>(config: &PasswordConfig, rng: &mut R) -> Zeroizing<String>
where
    R: RngCore + CryptoRng,
{
    let alphabets = config.class_alphabets();
    let charset = config.charset();

    let mut password_bytes = Zeroizing::new(Vec::with_capacity(
        config.length.max(alphabets.len()),
    ));

    for alphabet in &alphabets {
        password_bytes.push(pick(alphabet, rng));
    }

    let remaining = config.length.saturating_sub(alphabets.len());
    for _ in 0..remaining {
        password_bytes.push(pick(&charset, rng));
    }

    for i in (1..password_bytes.len()).rev() {
        let j = rng.gen_range(0..=i);
        password_bytes.swap(i, j);
    }

    debug!(
        length = password_bytes.len(),
        classes = alphabets.len(),
        charset_size = charset.len(),
        "generated password"
    );

    Zeroizing::new(password_bytes.iter().map(|&b| b as char).collect())
}

// gen_range rejects out-of-zone samples, so no modulo bias.
fn pick<R: RngCore + CryptoRng>(alphabet: &[u8], rng: &mut R) -> u8 {
    alphabet[rng.gen_range(0..alphabet.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    fn config_from(flags: [bool; 5], length: usize) -> PasswordConfig {
        PasswordConfig {
            length,
            include_uppercase: flags[0],
            include_lowercase: flags[1],
            include_numbers: flags[2],
            include_special_chars: flags[3],
            exclude_similar: flags[4],
        }
    }

    #[test]
    fn test_alphabet_sizes() {
        assert_eq!(UPPERCASE.len(), 26);
        assert_eq!(LOWERCASE.len(), 26);
        assert_eq!(NUMBERS.len(), 10);
        assert_eq!(SPECIAL_CHARS.len(), 26);

        let unique: HashSet<_> = SPECIAL_CHARS.iter().collect();
        assert_eq!(unique.len(), SPECIAL_CHARS.len(), "Special chars contain duplicates");
    }

    #[test]
    fn test_default_config_length() {
        let password = generate_password(&PasswordConfig::default());
        assert_eq!(password.len(), DEFAULT_LENGTH);
    }

    #[test]
    fn test_seeded_generation_deterministic() {
        let config = PasswordConfig::default();
        let password1 = generate_password_with(&config, &mut ChaCha20Rng::seed_from_u64(42));
        let password2 = generate_password_with(&config, &mut ChaCha20Rng::seed_from_u64(42));
        assert_eq!(*password1, *password2);

        let password3 = generate_password_with(&config, &mut ChaCha20Rng::seed_from_u64(43));
        assert_ne!(*password1, *password3);
    }

    #[test]
    fn test_os_rng_not_deterministic() {
        let config = PasswordConfig {
            length: 12,
            ..PasswordConfig::default()
        };
        let password1 = generate_password(&config);
        let password2 = generate_password(&config);
        assert_ne!(*password1, *password2);
    }

    #[test]
    fn test_no_classes_defaults_to_lowercase() {
        let config = config_from([false, false, false, false, false], 20);
        let password = generate_password(&config);

        assert_eq!(password.len(), 20);
        assert!(password.bytes().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_no_classes_exclude_similar() {
        let config = config_from([false, false, false, false, true], 64);
        let password = generate_password(&config);

        assert_eq!(password.len(), 64);
        assert!(password.bytes().all(|c| !SIMILAR_CHARS.contains(&c)));
    }

    #[test]
    fn test_zero_length() {
        let config = config_from([false, false, false, false, false], 0);
        assert_eq!(*generate_password(&config), "");

        let config = config_from([true, true, false, false, false], 0);
        assert_eq!(generate_password(&config).len(), 2);
    }

    #[test]
    fn test_length_below_class_count_keeps_required() {
        let config = config_from([true, true, true, true, false], 2);
        let password = generate_password(&config);

        assert_eq!(password.len(), 4);
        assert!(password.bytes().any(|c| c.is_ascii_uppercase()));
        assert!(password.bytes().any(|c| c.is_ascii_lowercase()));
        assert!(password.bytes().any(|c| c.is_ascii_digit()));
        assert!(password.bytes().any(|c| SPECIAL_CHARS.contains(&c)));
    }

    #[test]
    fn test_required_chars_not_pinned_to_front() {
        // Uppercase is drawn first; over many runs it must land elsewhere too.
        let config = config_from([true, false, true, false, false], 8);
        let mut rng = ChaCha20Rng::seed_from_u64(7);

        let moved = (0..200).any(|_| {
            let password = generate_password_with(&config, &mut rng);
            !password.as_bytes()[0].is_ascii_uppercase()
        });
        assert!(moved);
    }

    #[test]
    fn test_charset_exclude_similar() {
        let config = config_from([true, true, true, true, true], 16);
        let charset = config.charset();

        for c in SIMILAR_CHARS {
            assert!(!charset.contains(c), "charset contains {}", *c as char);
        }
        assert_eq!(charset.len(), 26 + 26 + 10 + 26 - SIMILAR_CHARS.len());
    }

    proptest! {
        #[test]
        fn prop_length_and_class_coverage(
            flags in proptest::array::uniform5(any::<bool>()),
            extra in 0usize..64,
            seed in any::<u64>(),
        ) {
            let config = config_from(flags, 4 + extra);
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let password = generate_password_with(&config, &mut rng);

            prop_assert_eq!(password.len(), config.length);

            for alphabet in config.class_alphabets() {
                prop_assert!(password.bytes().any(|c| alphabet.contains(&c)));
            }

            let charset = config.charset();
            prop_assert!(password.bytes().all(|c| charset.contains(&c)));

            if config.exclude_similar {
                prop_assert!(password.bytes().all(|c| !SIMILAR_CHARS.contains(&c)));
            }
        }
    }
}
