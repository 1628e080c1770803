use chrono::{DateTime, Utc};

const UNITS: [(&str, i64); 6] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
    ("second", 1),
];

/// Relative age such as "3 hours ago"; "N/A" without a timestamp.
pub fn humanize_since(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "N/A".to_string();
    };

    let seconds = (now - timestamp).num_seconds();
    for (unit, length) in UNITS {
        if seconds >= length {
            let count = seconds / length;
            let plural = if count == 1 { "" } else { "s" };
            return format!("{count} {unit}{plural} ago");
        }
    }
    "just now".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::zero(), "just now")]
    #[case(Duration::seconds(-30), "just now")]
    #[case(Duration::seconds(1), "1 second ago")]
    #[case(Duration::seconds(59), "59 seconds ago")]
    #[case(Duration::minutes(1), "1 minute ago")]
    #[case(Duration::hours(3), "3 hours ago")]
    #[case(Duration::days(2), "2 days ago")]
    #[case(Duration::days(45), "1 month ago")]
    #[case(Duration::days(800), "2 years ago")]
    fn test_humanize(#[case] age: Duration, #[case] expected: &str) {
        let now = Utc::now();
        assert_eq!(humanize_since(Some(now - age), now), expected);
    }

    #[test]
    fn test_missing_timestamp() {
        assert_eq!(humanize_since(None, Utc::now()), "N/A");
    }
}
