//! Sequential document numbers (`JE-000001`, `INV-000042`, ...).

/// Journal entry prefix.
pub const JOURNAL_PREFIX: &str = "JE";
/// Invoice prefix.
pub const INVOICE_PREFIX: &str = "INV";
/// Stock movement prefix.
pub const MOVEMENT_PREFIX: &str = "MV";
/// Production order prefix.
pub const PRODUCTION_PREFIX: &str = "PO";
/// Point-of-sale prefix.
pub const SALE_PREFIX: &str = "POS";

/// Formats a document number as `{prefix}-{seq:06}`.
#[must_use]
pub fn format_number(prefix: &str, seq: u64) -> String {
    format!("{prefix}-{seq:06}")
}

/// Extracts the sequence from a number produced by [`format_number`].
#[must_use]
pub fn parse_sequence(prefix: &str, number: &str) -> Option<u64> {
    number
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .parse()
        .ok()
}

/// Returns the number following `last`, starting at 1 when there is none.
#[must_use]
pub fn next_number(prefix: &str, last: Option<&str>) -> String {
    let seq = last
        .and_then(|n| parse_sequence(prefix, n))
        .unwrap_or(0);
    format_number(prefix, seq + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(JOURNAL_PREFIX, 1), "JE-000001");
        assert_eq!(format_number(SALE_PREFIX, 1234), "POS-001234");
    }

    #[test]
    fn test_next_number() {
        assert_eq!(next_number(INVOICE_PREFIX, None), "INV-000001");
        assert_eq!(next_number(INVOICE_PREFIX, Some("INV-000041")), "INV-000042");
        assert_eq!(next_number(MOVEMENT_PREFIX, Some("garbage")), "MV-000001");
    }

    #[test]
    fn test_prefixes_do_not_collide() {
        // "PO" is a prefix of "POS"; sale numbers must not parse as production orders.
        assert_eq!(parse_sequence(PRODUCTION_PREFIX, "POS-000010"), None);
        assert_eq!(parse_sequence(PRODUCTION_PREFIX, "PO-000010"), Some(10));
    }
}
