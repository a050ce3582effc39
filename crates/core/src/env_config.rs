//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    parse_with_default(var, std::env::var(var).ok().as_deref(), default)
}

/// Read a string environment variable, treating blank values as unset.
#[must_use]
pub fn env_string(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Read a comma separated environment variable into trimmed, non-empty parts.
#[must_use]
pub fn env_list(var: &str) -> Option<Vec<String>> {
    split_list(std::env::var(var).ok().as_deref())
}

fn parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    raw: Option<&str>,
    default: T,
) -> T {
    let Some(value) = raw else {
        return default;
    };
    match value.trim().parse() {
        Ok(n) => n,
        Err(_) => {
            tracing::warn!(
                var,
                value = %value,
                default = %default,
                "invalid env var value, using default"
            );
            default
        },
    }
}

fn split_list(raw: Option<&str>) -> Option<Vec<String>> {
    let parts: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect();
    if parts.is_empty() { None } else { Some(parts) }
}
