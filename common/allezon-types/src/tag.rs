use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device a [`UserTag`] was recorded from. A closed enumeration — an
/// unrecognized string fails deserialization rather than being coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Device {
    Pc,
    Mobile,
    Tv,
}

/// The action a [`UserTag`] records. Selects which bin (`views`/`buys`)
/// a tag contributes to in a [`UserProfile`] and which aggregate column
/// it updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    View,
    Buy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_id: i64,
    pub brand_id: String,
    pub category_id: String,
    pub price: u32,
}

/// A single activity event. See spec §3.1.
///
/// `time` round-trips through the fixed millisecond layout
/// `YYYY-MM-DDTHH:MM:SS.sssZ` rather than chrono's general RFC3339
/// serializer, matching the wire format every client and the Kafka
/// payload use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTag {
    #[serde(with = "millis_rfc3339")]
    pub time: DateTime<Utc>,
    pub cookie: String,
    pub country: String,
    pub origin: String,
    pub device: Device,
    pub action: Action,
    pub product_info: ProductInfo,
}

impl UserTag {
    /// The map-insert key for this tag inside a [`UserProfile`] bin:
    /// its millisecond timestamp. Two tags with the same `(cookie,
    /// action, time_ms)` collapse to one on insert.
    pub fn time_ms(&self) -> i64 {
        self.time.timestamp_millis()
    }

    pub fn minute(&self) -> i64 {
        self.time.timestamp().div_euclid(60)
    }
}

/// Bounded recent history for one cookie, reconstructed for API
/// responses. Each list is returned newest-first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub cookie: String,
    pub views: Vec<UserTag>,
    pub buys: Vec<UserTag>,
}

/// (De)serializes a [`DateTime<Utc>`] through the fixed
/// `YYYY-MM-DDTHH:MM:SS.sssZ` layout (always exactly three fractional
/// digits, literal `Z`), rejecting any other layout rather than
/// accepting chrono's more permissive RFC3339 grammar.
pub mod millis_rfc3339 {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        format!("{}Z", value.format(FORMAT)).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw
            .strip_suffix('Z')
            .ok_or_else(|| D::Error::custom(format!("timestamp '{raw}' must end in 'Z'")))?;
        let naive = NaiveDateTime::parse_from_str(trimmed, FORMAT)
            .map_err(|err| D::Error::custom(format!("invalid timestamp '{raw}': {err}")))?;
        Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tag() -> UserTag {
        UserTag {
            time: "2021-01-01T00:00:00.123Z".parse::<DateTime<Utc>>().unwrap_or_else(|_| {
                chrono::TimeZone::with_ymd_and_hms(&Utc, 2021, 1, 1, 0, 0, 0)
                    .unwrap()
                    + chrono::Duration::milliseconds(123)
            }),
            cookie: "c".into(),
            country: "PL".into(),
            origin: "https://g/".into(),
            device: Device::Pc,
            action: Action::View,
            product_info: ProductInfo {
                product_id: 1337,
                brand_id: "adidas".into(),
                category_id: "shoes".into(),
                price: 100,
            },
        }
    }

    #[test]
    fn time_round_trips_fixed_layout() {
        let tag = sample_tag();
        let json = serde_json::to_string(&tag).unwrap();
        assert!(json.contains("\"2021-01-01T00:00:00.123Z\""));
        let back: UserTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }

    #[test]
    fn rejects_non_enum_device() {
        let raw = r#"{"time":"2021-01-01T00:00:00.000Z","cookie":"c","country":"PL","origin":"o",
            "device":"TOASTER","action":"VIEW","product_info":{"product_id":1,"brand_id":"b","category_id":"c","price":1}}"#;
        assert!(serde_json::from_str::<UserTag>(raw).is_err());
    }

    #[test]
    fn rejects_non_millis_layout() {
        let raw = r#"{"time":"2021-01-01T00:00:00Z","cookie":"c","country":"PL","origin":"o",
            "device":"PC","action":"VIEW","product_info":{"product_id":1,"brand_id":"b","category_id":"c","price":1}}"#;
        assert!(serde_json::from_str::<UserTag>(raw).is_err());
    }

    #[test]
    fn minute_floors_to_60s() {
        let tag = sample_tag();
        assert_eq!(tag.minute(), tag.time.timestamp() / 60);
    }
}
