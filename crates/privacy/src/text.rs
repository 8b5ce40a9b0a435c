use once_cell::sync::Lazy;
use regex::Regex;

static KEYED_CREDENTIAL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(password|passwd|pwd|pass|secret|api[_-]?key|apikey|token)(\s*[:=]\s*)([^\s,;&]+)",
    )
    .ok()
});

static BEARER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b(bearer)(\s+)([A-Za-z0-9._~+/=-]+)").ok());

/// Mask values of `password=...`, `token: ...` and `Bearer ...` pairs.
pub fn mask_credentials(text: &str) -> String {
    let mut masked = text.to_string();
    for re in [&*KEYED_CREDENTIAL, &*BEARER].into_iter().flatten() {
        masked = re.replace_all(&masked, "${1}${2}***").into_owned();
    }
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_keyed_credentials() {
        assert_eq!(
            mask_credentials("login failed password=hunter2, retry"),
            "login failed password=***, retry"
        );
        assert_eq!(mask_credentials("api_key: abc123"), "api_key: ***");
        assert_eq!(
            mask_credentials("Authorization: Bearer eyJhbGci.x"),
            "Authorization: Bearer ***"
        );
    }

    #[test]
    fn leaves_ordinary_prose_alone() {
        let text = "Element did not pass the visibility check";
        assert_eq!(mask_credentials(text), text);
    }
}
