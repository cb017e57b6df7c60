use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a server timestamp. The backend emits both RFC 3339 strings and
/// naive `isoformat()` strings without an offset; naive values are taken
/// as UTC. Unparseable input yields `None` rather than an error.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    None
}

/// serde adapter for optional, format-tolerant timestamp fields.
pub mod flexible {
    use super::parse_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(at) => serializer.serialize_str(&at.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::parse_timestamp;

    #[test]
    fn parses_rfc3339() {
        let at = parse_timestamp("2026-03-01T08:30:00Z").unwrap();
        assert_eq!(at.to_rfc3339(), "2026-03-01T08:30:00+00:00");
    }

    #[test]
    fn parses_naive_isoformat_as_utc() {
        let at = parse_timestamp("2026-03-01T08:30:00.250").unwrap();
        assert_eq!(at.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn parses_space_separated() {
        assert!(parse_timestamp("2026-03-01 08:30:00").is_some());
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_timestamp("yesterday-ish").is_none());
    }
}
