use url::Url;

/// Strip credentials and fragment from a URL and mask query values whose key
/// is not explicitly allowed. Unparseable input is returned unchanged.
pub fn redact_url(raw: &str, allow_keys: &[&str]) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return raw.to_string();
    };
    let mut redacted = format!("{}://", parsed.scheme());
    if let Some(host) = parsed.host_str() {
        redacted.push_str(host);
    }
    if let Some(port) = parsed.port() {
        redacted.push(':');
        redacted.push_str(&port.to_string());
    }
    if let Some(path) = parsed.path().strip_prefix('/') {
        if !path.is_empty() {
            redacted.push('/');
            redacted.push_str(path);
        }
    }

    let filtered: Vec<String> = parsed
        .query_pairs()
        .map(|(key, value)| {
            if allow_keys.iter().any(|k| *k == key.as_ref()) {
                format!("{}={}", key, value)
            } else {
                format!("{}=***", key)
            }
        })
        .collect();
    if !filtered.is_empty() {
        redacted.push('?');
        redacted.push_str(&filtered.join("&"));
    }
    redacted
}
