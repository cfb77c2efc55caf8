//! Cache key generators for consistent key naming.

/// Default prefix for all cache keys.
pub const DEFAULT_PREFIX: &str = "optima:cache";

/// Generate a cache key for an organisation by ID.
#[must_use]
pub fn organisation(prefix: &str, organisation_id: &str) -> String {
    format!("{}:organisation:{}", prefix, organisation_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organisation_key() {
        assert_eq!(
            organisation(DEFAULT_PREFIX, "O1"),
            "optima:cache:organisation:O1"
        );
    }

    #[test]
    fn test_custom_prefix() {
        assert_eq!(organisation("tenant-a", "O1"), "tenant-a:organisation:O1");
    }
}
