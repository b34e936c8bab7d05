/// Literal token the OpenFlights dumps use for an absent value.
pub const MISSING_MARKER: &str = "\\N";

/// `\N` and empty fields both become null. Tokens like `NA` are real values
/// (Namibia's country code) and pass through.
pub fn is_missing(raw: &str) -> bool {
    raw == MISSING_MARKER || raw.is_empty()
}

/// Map a raw field to `None` when it is a missing value.
pub fn non_missing(raw: &str) -> Option<&str> {
    if is_missing(raw) {
        None
    } else {
        Some(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_and_empty_are_missing() {
        assert!(is_missing("\\N"));
        assert!(is_missing(""));
        assert!(!is_missing("N"));
        assert!(!is_missing("NA"));
        assert!(!is_missing("\\N\\N"));
        assert_eq!(non_missing("GKA"), Some("GKA"));
        assert_eq!(non_missing("\\N"), None);
    }
}
