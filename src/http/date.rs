//! HTTP date handling
//!
//! Parses the three date layouts HTTP/1.1 allows in headers and formats
//! `Last-Modified` values.

use chrono::{DateTime, NaiveDateTime, Utc};

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

const SHORT_WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const LONG_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A header date layout split at its leading weekday name.
///
/// The weekday must be a real day name but is not checked against the
/// date, so `Mon, 06 May 2023 ...` parses even though that day was a
/// Saturday.
#[derive(Debug, Clone, Copy)]
struct Layout {
    weekdays: &'static [&'static str; 7],
    separator: &'static str,
    fields: &'static str,
}

impl Layout {
    fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        let (weekday, rest) = text.split_once(self.separator)?;
        if !self
            .weekdays
            .iter()
            .any(|name| name.eq_ignore_ascii_case(weekday))
        {
            return None;
        }
        NaiveDateTime::parse_from_str(rest, self.fields)
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Ordered list of accepted header date layouts.
///
/// Built once at startup and shared by reference with everything that
/// evaluates conditional headers.
#[derive(Debug, Clone)]
pub struct DateFormats {
    layouts: Vec<Layout>,
}

impl DateFormats {
    /// The layouts allowed by HTTP/1.1, primary format first
    pub fn http() -> Self {
        Self {
            layouts: vec![
                // Sun, 06 Nov 1994 08:49:37 GMT
                Layout {
                    weekdays: &SHORT_WEEKDAYS,
                    separator: ", ",
                    fields: "%d %b %Y %H:%M:%S GMT",
                },
                // obsolete RFC 850: Sunday, 06-Nov-94 08:49:37 GMT
                Layout {
                    weekdays: &LONG_WEEKDAYS,
                    separator: ", ",
                    fields: "%d-%b-%y %H:%M:%S GMT",
                },
                // asctime(): Sun Nov  6 08:49:37 1994
                Layout {
                    weekdays: &SHORT_WEEKDAYS,
                    separator: " ",
                    fields: "%b %e %H:%M:%S %Y",
                },
            ],
        }
    }

    /// Parse `text` with each layout in order; the first success wins.
    pub fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        self.layouts.iter().find_map(|layout| layout.parse(text))
    }
}

impl Default for DateFormats {
    fn default() -> Self {
        Self::http()
    }
}

/// Format a timestamp as an IMF-fixdate header value.
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(IMF_FIXDATE).to_string()
}

/// Whether a modification time is obviously unspecified (missing or the Unix epoch).
pub fn is_unspecified(time: Option<DateTime<Utc>>) -> bool {
    time.is_none_or(|t| t == DateTime::<Utc>::UNIX_EPOCH)
}
