use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use url::Url;

pub const SHORT_CODE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
pub const DEFAULT_SHORT_CODE_LENGTH: usize = 6;
pub const DEFAULT_DISPLAY_LENGTH: usize = 50;

fn has_http_scheme(url: &str) -> bool {
    let lower = url
        .get(..8)
        .unwrap_or(url)
        .to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Trims the input and prefixes `https://` when it carries no http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

pub fn is_valid_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return false;
    }

    match Url::parse(&normalize_url(url)) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

pub fn generate_short_code(length: usize) -> String {
    generate_short_code_with(length, &mut OsRng)
}

pub fn generate_short_code_with<R>(length: usize, rng: &mut R) -> String
where
    R: RngCore + CryptoRng,
{
    (0..length)
        .map(|_| SHORT_CODE_ALPHABET[rng.gen_range(0..SHORT_CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn format_url_for_display(url: &str, max_length: usize) -> String {
    if url.chars().count() <= max_length {
        return url.to_string();
    }

    let keep = max_length.saturating_sub(3);
    let mut shortened: String = url.chars().take(keep).collect();
    shortened.push_str("...");
    shortened
}

pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_default()
}
