use url::Url;

/// Canonicalizes a website URL or bare domain into a lower-cased hostname
/// with one leading `www.` removed.
///
/// Empty input passes through as empty. Input that cannot be parsed is
/// returned unchanged.
pub fn normalize_domain(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }
    parse_host(input).unwrap_or_else(|| input.to_string())
}

/// Strict form of [`normalize_domain`]: `None` when no hostname can be parsed.
pub fn parse_host(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate).ok()?;
    let host = parsed.host_str().filter(|h| !h.is_empty())?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Gives scheme-less input an `https://` scheme. Input that already names a
/// scheme is kept as typed.
pub fn canonical_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
