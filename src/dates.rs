use time::{macros::format_description, Date};

/// Parses a `YYYY-MM-DD` diary date.
pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
}

pub fn format_date(date: Date) -> Result<String, time::error::Format> {
    date.format(format_description!("[year]-[month]-[day]"))
}

/// `#[serde(with = "crate::dates::iso_date")]` for `time::Date` fields.
pub mod iso_date {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = super::format_date(*date).map_err(<S::Error as ser::Error>::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod date_tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2023-11-24").unwrap(), date!(2023 - 11 - 24));
        assert_eq!(format_date(date!(2024 - 01 - 05)).unwrap(), "2024-01-05");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("24/11/2023").is_err());
        assert!(parse_date("2023-02-30").is_err());
        assert!(parse_date("").is_err());
    }
}
