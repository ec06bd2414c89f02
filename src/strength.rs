use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

pub const GUESSES_PER_SECOND: f64 = 1e9;
pub const ENTROPY_BONUS_THRESHOLD: f64 = 100.0;

pub const UPPERCASE_POOL: u32 = 26;
pub const LOWERCASE_POOL: u32 = 26;
pub const DIGIT_POOL: u32 = 10;
pub const SPECIAL_POOL: u32 = 32;

const COMMON_PASSWORDS: [&str; 24] = [
    "password", "123456", "12345678", "qwerty", "abc123", "monkey", "1234567", "letmein",
    "trustno1", "dragon", "baseball", "iloveyou", "master", "sunshine", "ashley", "bailey",
    "passw0rd", "shadow", "123123", "654321", "superman", "qazwsx", "michael", "football",
];

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3_600.0;
const DAY: f64 = 86_400.0;
const MONTH: f64 = 2_592_000.0;
const YEAR: f64 = 31_536_000.0;
const CENTURY: f64 = 3_153_600_000.0;
const MILLENNIA_CUTOFF: f64 = 31_536_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl Strength {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => Self::Weak,
            3..=4 => Self::Medium,
            5..=6 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
            Self::VeryStrong => "very-strong",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthResult {
    pub strength: Strength,
    pub score: u8,
    pub feedback: Vec<String>,
    pub crack_time: String,
    pub entropy: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharClasses {
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub special: bool,
}

impl CharClasses {
    pub fn of(password: &str) -> Self {
        password.chars().fold(Self::default(), |mut acc, c| {
            match c {
                'A'..='Z' => acc.uppercase = true,
                'a'..='z' => acc.lowercase = true,
                '0'..='9' => acc.digits = true,
                _ => acc.special = true,
            }
            acc
        })
    }

    pub fn count(&self) -> u8 {
        [self.uppercase, self.lowercase, self.digits, self.special]
            .iter()
            .filter(|present| **present)
            .count() as u8
    }

    pub fn pool_size(&self) -> u32 {
        let mut pool = 0;
        if self.uppercase {
            pool += UPPERCASE_POOL;
        }
        if self.lowercase {
            pool += LOWERCASE_POOL;
        }
        if self.digits {
            pool += DIGIT_POOL;
        }
        if self.special {
            pool += SPECIAL_POOL;
        }
        pool
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictablePattern {
    RepeatedCharacter,
    SequentialDigits,
    SequentialLetters,
    KeyboardRow,
}

struct PatternSet {
    sequential_digits: Regex,
    sequential_letters: Regex,
    keyboard_row: Regex,
}

static PATTERNS: OnceLock<PatternSet> = OnceLock::new();

fn patterns() -> &'static PatternSet {
    PATTERNS.get_or_init(|| PatternSet {
        sequential_digits: Regex::new(r"^(?:01|12|23|34|45|56|67|78|89|90)+$")
            .expect("Invalid sequential digits regex"),
        sequential_letters: Regex::new(
            r"(?i)^(?:abc|bcd|cde|def|efg|fgh|ghi|hij|ijk|jkl|klm|lmn|mno|nop|opq|pqr|qrs|rst|stu|tuv|uvw|vwx|wxy|xyz)+$",
        )
        .expect("Invalid sequential letters regex"),
        keyboard_row: Regex::new(r"(?i)^(?:qwerty|asdfgh|zxcvbn)+$")
            .expect("Invalid keyboard row regex"),
    })
}

pub fn find_pattern(password: &str) -> Option<PredictablePattern> {
    let set = patterns();

    if is_single_repeated(password) {
        Some(PredictablePattern::RepeatedCharacter)
    } else if set.sequential_digits.is_match(password) {
        Some(PredictablePattern::SequentialDigits)
    } else if set.sequential_letters.is_match(password) {
        Some(PredictablePattern::SequentialLetters)
    } else if set.keyboard_row.is_match(password) {
        Some(PredictablePattern::KeyboardRow)
    } else {
        None
    }
}

// Line terminators never count as a repeated character.
fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_single_repeated(password: &str) -> bool {
    let mut chars = password.chars();
    match chars.next() {
        Some(first) if !is_line_terminator(first) => {
            let mut rest = chars.peekable();
            rest.peek().is_some() && rest.all(|c| c == first)
        }
        _ => false,
    }
}

pub fn has_repeated_run(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars
        .windows(3)
        .any(|w| !is_line_terminator(w[0]) && w[0] == w[1] && w[1] == w[2])
}

pub fn is_common_password(password: &str) -> bool {
    let lowered = password.to_lowercase();
    COMMON_PASSWORDS.contains(&lowered.as_str())
}

/// `log2(pool^length)` over the classes actually present in the password.
///
/// This is a search-space estimate, not measured randomness: it overstates
/// the entropy of anything a human picked.
pub fn calculate_entropy(password: &str) -> f64 {
    let pool = CharClasses::of(password).pool_size();
    if pool == 0 {
        return 0.0;
    }
    password.chars().count() as f64 * f64::from(pool).log2()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CrackTimeBucket {
    Instant,
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
    Years,
    Centuries,
    MillionsOfYears,
}

pub fn seconds_to_crack(entropy: f64) -> f64 {
    2f64.powf(entropy) / (2.0 * GUESSES_PER_SECOND)
}

pub fn crack_time_bucket(seconds: f64) -> CrackTimeBucket {
    if seconds < 1.0 {
        CrackTimeBucket::Instant
    } else if seconds < MINUTE {
        CrackTimeBucket::Seconds
    } else if seconds < HOUR {
        CrackTimeBucket::Minutes
    } else if seconds < DAY {
        CrackTimeBucket::Hours
    } else if seconds < MONTH {
        CrackTimeBucket::Days
    } else if seconds < YEAR {
        CrackTimeBucket::Months
    } else if seconds < CENTURY {
        CrackTimeBucket::Years
    } else if seconds < MILLENNIA_CUTOFF {
        CrackTimeBucket::Centuries
    } else {
        CrackTimeBucket::MillionsOfYears
    }
}

pub fn estimate_crack_time(entropy: f64) -> String {
    let seconds = seconds_to_crack(entropy);
    let scaled = |unit: f64, label: &str| format!("{} {}", (seconds / unit).round(), label);

    match crack_time_bucket(seconds) {
        CrackTimeBucket::Instant => "Instant".to_string(),
        CrackTimeBucket::Seconds => scaled(1.0, "seconds"),
        CrackTimeBucket::Minutes => scaled(MINUTE, "minutes"),
        CrackTimeBucket::Hours => scaled(HOUR, "hours"),
        CrackTimeBucket::Days => scaled(DAY, "days"),
        CrackTimeBucket::Months => scaled(MONTH, "months"),
        CrackTimeBucket::Years => scaled(YEAR, "years"),
        CrackTimeBucket::Centuries => scaled(CENTURY, "centuries"),
        CrackTimeBucket::MillionsOfYears => "Millions of years".to_string(),
    }
}

// A 4-class password keeps its remark despite later flags; a 3-class one
// only when nothing else was said.
fn earns_remark(feedback: &[String]) -> bool {
    match feedback.first() {
        Some(first) if first.contains("Excellent") => true,
        Some(first) => feedback.len() == 1 && first.contains("Great"),
        None => false,
    }
}

pub fn analyze_strength(password: &str) -> StrengthResult {
    if password.is_empty() {
        return StrengthResult {
            strength: Strength::Weak,
            score: 0,
            feedback: vec!["Password is empty".to_string()],
            crack_time: "Instant".to_string(),
            entropy: 0.0,
        };
    }

    let mut feedback: Vec<String> = Vec::new();
    let mut score: u8 = 0;

    match password.chars().count() {
        0..=7 => {
            feedback.push("Password should be at least 8 characters long".to_string());
        }
        8..=11 => score += 1,
        12..=15 => score += 2,
        _ => score += 3,
    }

    let classes = CharClasses::of(password);
    match classes.count() {
        0 | 1 => {
            feedback.push(
                "Add different types of characters (uppercase, lowercase, numbers, symbols)"
                    .to_string(),
            );
        }
        2 => {
            score += 1;
            feedback.push("Good variety, but consider adding more character types".to_string());
        }
        3 => {
            score += 2;
            feedback.push("Great variety of character types".to_string());
        }
        _ => {
            score += 3;
            feedback.push("Excellent variety of character types".to_string());
        }
    }

    let entropy = calculate_entropy(password);
    if entropy >= ENTROPY_BONUS_THRESHOLD {
        score += 1;
    }

    if is_common_password(password) {
        score = score.saturating_sub(3);
        feedback.push("This is a commonly used password".to_string());
    }

    if let Some(pattern) = find_pattern(password) {
        debug!(?pattern, "predictable pattern matched");
        score = score.saturating_sub(2);
        feedback.push("Avoid predictable patterns".to_string());
    }

    if has_repeated_run(password) {
        score = score.saturating_sub(1);
        feedback.push("Avoid repeating characters".to_string());
    }

    let strength = Strength::from_score(score);

    if earns_remark(&feedback) {
        match strength {
            Strength::VeryStrong => feedback.push("This is a very strong password".to_string()),
            Strength::Strong => feedback.push("This is a strong password".to_string()),
            Strength::Weak | Strength::Medium => {}
        }
    }

    debug!(
        length = password.chars().count(),
        score,
        %strength,
        entropy,
        "analyzed password"
    );

    StrengthResult {
        strength,
        score,
        feedback,
        crack_time: estimate_crack_time(entropy),
        entropy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_password() {
        let result = analyze_strength("");
        assert_eq!(result.strength, Strength::Weak);
        assert_eq!(result.score, 0);
        assert_eq!(result.entropy, 0.0);
        assert_eq!(result.crack_time, "Instant");
        assert_eq!(result.feedback, vec!["Password is empty"]);
    }

    #[test]
    fn test_common_password() {
        let result = analyze_strength("password");
        assert_eq!(result.strength, Strength::Weak);
        assert_eq!(result.score, 0);
        assert!(
            result
                .feedback
                .contains(&"This is a commonly used password".to_string())
        );
    }

    #[test]
    fn test_common_password_case_insensitive() {
        assert!(is_common_password("PassWord"));
        assert!(is_common_password("TRUSTNO1"));
        assert!(!is_common_password("password1"));
    }

    #[test]
    fn test_very_strong_password() {
        let result = analyze_strength("Tr0ub4dor&3xyzLMNO");
        assert_eq!(result.strength, Strength::VeryStrong);
        assert_eq!(result.score, 7);
        assert_eq!(
            result.feedback,
            vec![
                "Excellent variety of character types",
                "This is a very strong password"
            ]
        );
    }

    #[test]
    fn test_strong_password_without_bonus() {
        // 16 chars over 62 symbols is ~95 bits, just under the bonus threshold.
        let result = analyze_strength("Abcdefgh12345xyZ");
        assert_eq!(result.score, 5);
        assert_eq!(result.strength, Strength::Strong);
        assert_eq!(
            result.feedback.last().map(String::as_str),
            Some("This is a strong password")
        );
    }

    #[test]
    fn test_entropy_lowercase_only() {
        let entropy = calculate_entropy("aaaa");
        assert!((entropy - 18.8).abs() < 0.01, "entropy was {}", entropy);
        assert!((entropy - 4.0 * 26f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn test_entropy_pool_sizes() {
        assert_eq!(CharClasses::of("aA").pool_size(), 52);
        assert_eq!(CharClasses::of("a1").pool_size(), 36);
        assert_eq!(CharClasses::of("a!").pool_size(), 58);
        assert_eq!(CharClasses::of("aA1!").pool_size(), 94);
        assert_eq!(CharClasses::of("é").pool_size(), 32);
    }

    #[test]
    fn test_entropy_long_password_is_finite() {
        let long = "aA1!".repeat(200);
        let entropy = calculate_entropy(&long);
        assert!(entropy.is_finite());
        assert_eq!(estimate_crack_time(entropy), "Millions of years");
    }

    #[test]
    fn test_short_password_feedback_order() {
        let result = analyze_strength("aaa");
        assert_eq!(
            result.feedback,
            vec![
                "Password should be at least 8 characters long",
                "Add different types of characters (uppercase, lowercase, numbers, symbols)",
                "Avoid predictable patterns",
                "Avoid repeating characters",
            ]
        );
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_repeated_password_flags_pattern_and_run() {
        // Whole-string repetition is a pattern; the 3-run check fires separately.
        let result = analyze_strength("11111111");
        assert_eq!(
            result.feedback,
            vec![
                "Add different types of characters (uppercase, lowercase, numbers, symbols)",
                "Avoid predictable patterns",
                "Avoid repeating characters",
            ]
        );
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_excellent_variety_keeps_remark_after_flag() {
        let result = analyze_strength("Tr0ub4dor&3xyzzzL");
        assert_eq!(result.score, 6);
        assert_eq!(result.strength, Strength::Strong);
        assert_eq!(
            result.feedback,
            vec![
                "Excellent variety of character types",
                "Avoid repeating characters",
                "This is a strong password",
            ]
        );
    }

    #[test]
    fn test_good_variety_gets_no_remark() {
        // 18 chars over 58 symbols clears the entropy bonus: 3 + 1 + 1.
        let result = analyze_strength("a!b@c#d$e%f^g&h*i(");
        assert_eq!(result.score, 5);
        assert_eq!(result.strength, Strength::Strong);
        assert_eq!(
            result.feedback,
            vec!["Good variety, but consider adding more character types"]
        );
    }

    #[test]
    fn test_great_variety_loses_remark_after_flag() {
        let result = analyze_strength("Abcdefgh1234xyZZZ");
        assert_eq!(result.strength, Strength::Strong);
        assert_eq!(
            result.feedback,
            vec!["Great variety of character types", "Avoid repeating characters"]
        );
    }

    #[test]
    fn test_line_terminators_do_not_repeat() {
        assert!(!has_repeated_run("ab\n\n\ncd"));
        assert!(!has_repeated_run("\r\r\r"));
        assert_eq!(find_pattern("\n\n\n\n"), None);
        assert!(has_repeated_run("a\n   b"));
    }

    #[test]
    fn test_find_pattern() {
        assert_eq!(find_pattern("aaaa"), Some(PredictablePattern::RepeatedCharacter));
        assert_eq!(find_pattern("123456"), Some(PredictablePattern::SequentialDigits));
        assert_eq!(find_pattern("7890"), Some(PredictablePattern::SequentialDigits));
        assert_eq!(find_pattern("ABCdef"), Some(PredictablePattern::SequentialLetters));
        assert_eq!(find_pattern("QwertyQWERTY"), Some(PredictablePattern::KeyboardRow));
        assert_eq!(find_pattern("a"), None);
        assert_eq!(find_pattern("12345"), None);
        assert_eq!(find_pattern("Tr0ub4dor"), None);
    }

    #[test]
    fn test_repeated_run() {
        assert!(has_repeated_run("abccc"));
        assert!(has_repeated_run("xx\u{1F512}\u{1F512}\u{1F512}"));
        assert!(!has_repeated_run("aabbaa"));
        assert!(!has_repeated_run(""));
    }

    #[test]
    fn test_strength_buckets() {
        assert_eq!(Strength::from_score(0), Strength::Weak);
        assert_eq!(Strength::from_score(2), Strength::Weak);
        assert_eq!(Strength::from_score(3), Strength::Medium);
        assert_eq!(Strength::from_score(4), Strength::Medium);
        assert_eq!(Strength::from_score(5), Strength::Strong);
        assert_eq!(Strength::from_score(6), Strength::Strong);
        assert_eq!(Strength::from_score(7), Strength::VeryStrong);
    }

    #[test]
    fn test_crack_time_formatting() {
        assert_eq!(estimate_crack_time(0.0), "Instant");
        // 2^35 / 2e9 ~= 17.2s
        assert_eq!(estimate_crack_time(35.0), "17 seconds");
        // 2^40 / 2e9 ~= 549.8s ~= 9.2 minutes
        assert_eq!(estimate_crack_time(40.0), "9 minutes");
        assert_eq!(estimate_crack_time(200.0), "Millions of years");
    }

    #[test]
    fn test_crack_time_bucket_thresholds() {
        assert_eq!(crack_time_bucket(0.5), CrackTimeBucket::Instant);
        assert_eq!(crack_time_bucket(59.9), CrackTimeBucket::Seconds);
        assert_eq!(crack_time_bucket(60.0), CrackTimeBucket::Minutes);
        assert_eq!(crack_time_bucket(86_399.0), CrackTimeBucket::Hours);
        assert_eq!(crack_time_bucket(2_591_999.0), CrackTimeBucket::Days);
        assert_eq!(crack_time_bucket(31_535_999.0), CrackTimeBucket::Months);
        assert_eq!(crack_time_bucket(3_153_599_999.0), CrackTimeBucket::Years);
        assert_eq!(crack_time_bucket(31_535_999_999.0), CrackTimeBucket::Centuries);
        assert_eq!(crack_time_bucket(f64::INFINITY), CrackTimeBucket::MillionsOfYears);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(analyze_strength("")).unwrap();
        assert_eq!(json["strength"], "weak");
        assert_eq!(json["crackTime"], "Instant");
        assert!(json.get("feedback").is_some());

        let json = serde_json::to_value(Strength::VeryStrong).unwrap();
        assert_eq!(json, "very-strong");
    }

    proptest! {
        #[test]
        fn prop_crack_time_monotonic(a in 0.0f64..1200.0, b in 0.0f64..1200.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low_bucket = crack_time_bucket(seconds_to_crack(low));
            let high_bucket = crack_time_bucket(seconds_to_crack(high));
            prop_assert!(low_bucket <= high_bucket);
        }

        #[test]
        fn prop_score_in_range(password in "\\PC{0,40}") {
            let result = analyze_strength(&password);
            prop_assert!(result.score <= 7);
            prop_assert_eq!(result.strength, Strength::from_score(result.score));
            prop_assert!(!result.feedback.is_empty());
        }
    }
}
