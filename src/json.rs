use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct JsonError(#[from] serde_json::Error);

impl JsonError {
    pub fn line(&self) -> usize {
        self.0.line()
    }

    pub fn column(&self) -> usize {
        self.0.column()
    }
}

/// Re-serialises `input` either pretty-printed with two-space indentation or
/// minified. Object key order is kept as written.
pub fn format_json(input: &str, minify: bool) -> Result<String, JsonError> {
    let parsed: Value = serde_json::from_str(input)?;
    let formatted = if minify {
        serde_json::to_string(&parsed)?
    } else {
        serde_json::to_string_pretty(&parsed)?
    };
    Ok(formatted)
}

pub fn validate_json(input: &str) -> bool {
    serde_json::from_str::<Value>(input).is_ok()
}
