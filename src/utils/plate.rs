/// A license plate normalized for portal input: uppercase, separators
/// (spaces, dashes, dots) stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateValue(String);

impl PlateValue {
    pub fn new(raw: &str) -> Self {
        Self(normalize_plate(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PlateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// "aa-123-bb" -> "AA123BB". Idempotent.
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize_plate("aa-123-bb"), "AA123BB");
        assert_eq!(normalize_plate(" AA 123 BB "), "AA123BB");
        assert_eq!(normalize_plate("aa.123.bb"), "AA123BB");
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["aa-123-bb", "AA123BB", " fh 454 dz", "1-ABC-234"] {
            let once = normalize_plate(raw);
            assert_eq!(normalize_plate(&once), once);
        }
    }

    #[test]
    fn test_empty_plate() {
        assert!(PlateValue::new("  - ").is_empty());
        assert!(!PlateValue::new("AB123CD").is_empty());
    }
}
