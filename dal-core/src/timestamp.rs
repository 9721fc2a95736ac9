use crate::{Error, Result};
use std::num::NonZeroU8;
use time::{
    Month, PrimitiveDateTime,
    format_description::{BorrowedFormatItem, StaticFormatDescription},
    macros::format_description,
    parsing::Parsed,
};

/// A textual timestamp layout accepted by the decoder.
pub struct TimestampFormat {
    pub items: StaticFormatDescription,
    /// Accept a trailing zone abbreviation (like `UTC` or `CET`), which is then ignored.
    pub zone_suffix: bool,
}

macro_rules! formats {
    ($($description:tt $(with $zone:ident)?),+ $(,)?) => {
        &[$(TimestampFormat {
            items: format_description!(version = 2, $description),
            zone_suffix: formats!(@zone $($zone)?),
        }),+]
    };
    (@zone zone) => { true };
    (@zone) => { false };
}

/// Accepted layouts, tried in order. The first one consuming the whole input wins.
///
/// Components missing from a layout default to year 0, January, day 1 and midnight.
pub const TIMESTAMP_FORMATS: &[TimestampFormat] = formats![
    "[month padding:none]/[day padding:none]/[year]",
    "[month padding:none]/[day padding:none]/[year] [hour padding:none]:[minute padding:none]:[second padding:none]",
    "[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute padding:none]:[second padding:none]",
    "[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute padding:none]",
    "[year]-[month padding:none]-[day padding:none]",
    "[month padding:none]-[day padding:none]",
    "[hour padding:none]:[minute padding:none]:[second padding:none]",
    "[hour padding:none]:[minute padding:none]",
    "[hour padding:none]",
    "[hour padding:none]:[minute padding:none]:[second padding:none] [month repr:short] [day padding:none], [year] " with zone,
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]",
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]][optional [Z]]",
];

/// Canonical rendering used whenever a timestamp becomes text.
const CANONICAL: StaticFormatDescription =
    format_description!(version = 2, "[year]-[month]-[day] [hour]:[minute]:[second]");
const CANONICAL_SUBSECOND: StaticFormatDescription = format_description!(
    version = 2,
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"
);

/// Parse `input` against [`TIMESTAMP_FORMATS`].
pub fn parse_timestamp(input: &str) -> Result<PrimitiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| try_format(input, format.items, format.zone_suffix))
        .ok_or_else(|| {
            Error::msg(format!(
                "Unknown timestamp format: `{input}` does not match any accepted layout"
            ))
        })
}

fn try_format(
    input: &str,
    items: &[BorrowedFormatItem<'_>],
    zone_suffix: bool,
) -> Option<PrimitiveDateTime> {
    let mut parsed = Parsed::new();
    let remaining = parsed.parse_items(input.as_bytes(), items).ok()?;
    let complete = if zone_suffix {
        !remaining.is_empty() && remaining.iter().all(u8::is_ascii_alphabetic)
    } else {
        remaining.is_empty()
    };
    if !complete {
        return None;
    }
    if parsed.year().is_none() {
        parsed.set_year(0)?;
    }
    if parsed.month().is_none() {
        parsed.set_month(Month::January)?;
    }
    if parsed.day().is_none() {
        parsed.set_day(NonZeroU8::MIN)?;
    }
    if parsed.hour_24().is_none() {
        parsed.set_hour_24(0)?;
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }
    if parsed.second().is_none() {
        parsed.set_second(0)?;
    }
    PrimitiveDateTime::try_from(parsed).ok()
}

/// Render `value` in the canonical text format, `YYYY-MM-DD hh:mm:ss` with a fractional part
/// only when the value has one.
pub fn format_timestamp(value: &PrimitiveDateTime) -> String {
    let items = if value.nanosecond() == 0 {
        CANONICAL
    } else {
        CANONICAL_SUBSECOND
    };
    value
        .format(items)
        .unwrap_or_else(|_| value.to_string())
}
