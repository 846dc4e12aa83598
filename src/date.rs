//! The backend date format.
//!
//! Dates travel as `2024-03-22T10:15:30.123+0000`: millisecond precision, a
//! numeric UTC offset, no locale-dependent parts. Use [`backend_date`] with
//! `#[serde(with = "...")]` on `DateTime<Utc>` fields:
//!
//! ```
//! use api_manager::date::backend_date;
//! use chrono::{DateTime, Utc};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Employee {
//!     name: String,
//!     #[serde(with = "backend_date")]
//!     hired_at: DateTime<Utc>,
//!     #[serde(with = "backend_date::option", default)]
//!     left_at: Option<DateTime<Utc>>,
//! }
//! ```

use chrono::format::{parse as parse_with_items, Item, Parsed, StrftimeItems};
use chrono::{DateTime, Utc};
use std::sync::OnceLock;

/// `yyyy-MM-dd'T'HH:mm:ss.SSSZ` expressed as a chrono format string.
pub const BACKEND_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Parsed format items, built on first use and never mutated afterwards.
fn items() -> &'static [Item<'static>] {
    static ITEMS: OnceLock<Vec<Item<'static>>> = OnceLock::new();
    ITEMS.get_or_init(|| StrftimeItems::new(BACKEND_DATE_FORMAT).collect())
}

/// Formats a UTC date in the backend format.
///
/// ```
/// use chrono::{TimeZone, Utc};
///
/// let date = Utc.with_ymd_and_hms(2024, 3, 22, 10, 15, 30).unwrap();
/// assert_eq!(api_manager::date::format(&date), "2024-03-22T10:15:30.000+0000");
/// ```
pub fn format(date: &DateTime<Utc>) -> String {
    date.format_with_items(items().iter()).to_string()
}

/// Parses a backend-formatted date, normalizing any offset to UTC.
pub fn parse(input: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let mut parsed = Parsed::new();
    parse_with_items(&mut parsed, input, items().iter())?;
    Ok(parsed.to_datetime()?.with_timezone(&Utc))
}

/// Serde adapter for `DateTime<Utc>` fields in the backend format.
pub mod backend_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module, for `Option<DateTime<Utc>>` (`null` ↔ `None`).
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => serializer.serialize_some(&crate::date::format(date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => crate::date::parse(&raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
