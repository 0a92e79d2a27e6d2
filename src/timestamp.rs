//! Resolves the two timestamp shapes the store can hand us into one
//! fixed-locale display string (JST, `YYYY/MM/DD HH:MM:SS`).

use crate::types::RawTimestamp;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

const JST_OFFSET_SECS: i32 = 9 * 3600;
const DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Resolve an optional raw timestamp into its display string. Absent and
/// unparseable inputs both collapse to `sentinel`, so render code never
/// branches on "missing".
pub fn normalize(raw: Option<&RawTimestamp>, sentinel: &str) -> String {
    match raw {
        Some(RawTimestamp::Structured(dt)) => display(*dt),
        Some(RawTimestamp::Text(text)) => match parse_text(text) {
            Some(dt) => display(dt),
            None => {
                debug!("unparseable timestamp '{}', using sentinel", text);
                sentinel.to_string()
            }
        },
        None => sentinel.to_string(),
    }
}

/// Resolve a raw timestamp into a comparable instant, for ordering fallbacks.
/// Unparseable and absent timestamps sort oldest.
pub fn instant(raw: Option<&RawTimestamp>) -> DateTime<Utc> {
    match raw {
        Some(RawTimestamp::Structured(dt)) => *dt,
        Some(RawTimestamp::Text(text)) => parse_text(text).unwrap_or_default(),
        None => DateTime::<Utc>::default(),
    }
}

fn display(dt: DateTime<Utc>) -> String {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS).expect("JST offset is valid");
    dt.with_timezone(&jst).format(DISPLAY_FORMAT).to_string()
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    // Bare "date time" strings, assumed UTC.
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FETCH_TIME_UNKNOWN, PUBLISH_TIME_UNKNOWN};
    use chrono::TimeZone;

    #[test]
    fn structured_and_text_agree_for_the_same_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
        let structured = RawTimestamp::Structured(instant);
        let text = RawTimestamp::Text("2024-01-05T10:00:00Z".to_string());

        let a = normalize(Some(&structured), PUBLISH_TIME_UNKNOWN);
        let b = normalize(Some(&text), PUBLISH_TIME_UNKNOWN);
        assert_eq!(a, b);
        assert_eq!(a, "2024/01/05 19:00:00"); // JST is UTC+9
    }

    #[test]
    fn rfc2822_pub_dates_parse() {
        let text = RawTimestamp::Text("Fri, 05 Jan 2024 10:00:00 +0000".to_string());
        assert_eq!(
            normalize(Some(&text), PUBLISH_TIME_UNKNOWN),
            "2024/01/05 19:00:00"
        );
    }

    #[test]
    fn missing_timestamp_becomes_sentinel() {
        assert_eq!(normalize(None, PUBLISH_TIME_UNKNOWN), PUBLISH_TIME_UNKNOWN);
        assert_eq!(normalize(None, FETCH_TIME_UNKNOWN), FETCH_TIME_UNKNOWN);
    }

    #[test]
    fn garbage_timestamp_becomes_sentinel() {
        let text = RawTimestamp::Text("around noon, probably".to_string());
        assert_eq!(normalize(Some(&text), PUBLISH_TIME_UNKNOWN), PUBLISH_TIME_UNKNOWN);
    }

    #[test]
    fn instants_order_unparseable_oldest() {
        let good = RawTimestamp::Structured(Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap());
        let bad = RawTimestamp::Text("???".to_string());
        assert!(instant(Some(&good)) > instant(Some(&bad)));
        assert_eq!(instant(Some(&bad)), instant(None));
    }
}
