/// Extract a country token from a free-text location such as `"San Francisco, CA, USA"`.
///
/// Returns the last non-empty comma-separated segment, trimmed but otherwise verbatim.
/// Locations not shaped like `"…, …, Country"` misparse; no geocoding is attempted.
pub fn parse_country(location: Option<&str>) -> String {
    location
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_last_segment() {
        assert_eq!(parse_country(Some("San Francisco, CA, USA")), "USA");
        assert_eq!(parse_country(Some("Berlin, Germany")), "Germany");
    }

    #[test]
    fn single_segment_is_returned_as_is() {
        assert_eq!(parse_country(Some("Remote")), "Remote");
        assert_eq!(parse_country(Some("  Remote  ")), "Remote");
    }

    #[test]
    fn missing_or_empty_input_yields_empty() {
        assert_eq!(parse_country(None), "");
        assert_eq!(parse_country(Some("")), "");
        assert_eq!(parse_country(Some(" , ,")), "");
    }

    #[test]
    fn trailing_empty_segment_is_skipped() {
        assert_eq!(parse_country(Some("Paris, ")), "Paris");
        assert_eq!(parse_country(Some("Lyon, France,")), "France");
    }

    #[test]
    fn abbreviations_are_not_expanded() {
        assert_eq!(parse_country(Some("Austin, TX")), "TX");
    }
}
