//! Countdown configuration
//!
//! Parsed from the element's attributes on every (re)calculation. Parsing is
//! permissive: a malformed duration counts as zero, an unparseable target is
//! ignored, and unknown unit names are dropped from the format.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lumen_core::{AttributeKey, AttributeMap};
use smallvec::SmallVec;

/// Attributes observed by `<lumen-countdown>`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownAttr {
    /// Absolute deadline; wins over `duration`
    Target,
    /// Relative length in seconds
    Duration,
    /// Ordered comma separated subset of `days,hours,minutes,seconds`
    Format,
    Autostart,
    /// Markup shown instead of the units once time runs out
    Expired,
    /// Pad numerals to two digits
    Pad,
    /// Keep zero-valued units visible
    ShowZero,
    /// Extra classes for each unit container
    UnitClass,
    LabelDay,
    LabelDays,
    LabelHour,
    LabelHours,
    LabelMinute,
    LabelMinutes,
    LabelSecond,
    LabelSeconds,
}

impl AttributeKey for CountdownAttr {
    fn all() -> &'static [Self] {
        use CountdownAttr::*;
        &[
            Target,
            Duration,
            Format,
            Autostart,
            Expired,
            Pad,
            ShowZero,
            UnitClass,
            LabelDay,
            LabelDays,
            LabelHour,
            LabelHours,
            LabelMinute,
            LabelMinutes,
            LabelSecond,
            LabelSeconds,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            CountdownAttr::Target => "target",
            CountdownAttr::Duration => "duration",
            CountdownAttr::Format => "format",
            CountdownAttr::Autostart => "autostart",
            CountdownAttr::Expired => "expired",
            CountdownAttr::Pad => "pad",
            CountdownAttr::ShowZero => "show-zero",
            CountdownAttr::UnitClass => "unit-class",
            CountdownAttr::LabelDay => "label-day",
            CountdownAttr::LabelDays => "label-days",
            CountdownAttr::LabelHour => "label-hour",
            CountdownAttr::LabelHours => "label-hours",
            CountdownAttr::LabelMinute => "label-minute",
            CountdownAttr::LabelMinutes => "label-minutes",
            CountdownAttr::LabelSecond => "label-second",
            CountdownAttr::LabelSeconds => "label-seconds",
        }
    }
}

impl CountdownAttr {
    /// Whether a change to this attribute changes the countdown length
    pub fn affects_timing(&self) -> bool {
        matches!(self, CountdownAttr::Target | CountdownAttr::Duration)
    }
}

/// Display unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::Days, Unit::Hours, Unit::Minutes, Unit::Seconds];

    pub fn parse(name: &str) -> Option<Unit> {
        match name.trim().to_ascii_lowercase().as_str() {
            "days" | "day" | "d" => Some(Unit::Days),
            "hours" | "hour" | "h" => Some(Unit::Hours),
            "minutes" | "minute" | "m" => Some(Unit::Minutes),
            "seconds" | "second" | "s" => Some(Unit::Seconds),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Unit::Days => "days",
            Unit::Hours => "hours",
            Unit::Minutes => "minutes",
            Unit::Seconds => "seconds",
        }
    }

    fn default_labels(&self) -> (&'static str, &'static str) {
        match self {
            Unit::Days => ("day", "days"),
            Unit::Hours => ("hour", "hours"),
            Unit::Minutes => ("minute", "minutes"),
            Unit::Seconds => ("second", "seconds"),
        }
    }

    fn label_attrs(&self) -> (CountdownAttr, CountdownAttr) {
        match self {
            Unit::Days => (CountdownAttr::LabelDay, CountdownAttr::LabelDays),
            Unit::Hours => (CountdownAttr::LabelHour, CountdownAttr::LabelHours),
            Unit::Minutes => (CountdownAttr::LabelMinute, CountdownAttr::LabelMinutes),
            Unit::Seconds => (CountdownAttr::LabelSecond, CountdownAttr::LabelSeconds),
        }
    }
}

/// Singular/plural label pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitLabel {
    pub singular: String,
    pub plural: String,
}

impl UnitLabel {
    /// Singular only when the value is exactly one
    pub fn for_value(&self, value: u64) -> &str {
        if value == 1 {
            &self.singular
        } else {
            &self.plural
        }
    }
}

/// Everything a countdown reads from its attributes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownConfig {
    pub target: Option<DateTime<Utc>>,
    pub duration: u64,
    pub format: SmallVec<[Unit; 4]>,
    pub autostart: bool,
    pub expired: Option<String>,
    pub pad: bool,
    pub show_zero: bool,
    pub unit_class: Option<String>,
    labels: [UnitLabel; 4],
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self::from_attributes(&AttributeMap::new())
    }
}

impl CountdownConfig {
    pub fn from_attributes(attrs: &AttributeMap) -> Self {
        let mut format: SmallVec<[Unit; 4]> = SmallVec::new();
        let names = attrs.list(CountdownAttr::Format.name());
        for unit in names.iter().filter_map(|name| Unit::parse(name)) {
            if !format.contains(&unit) {
                format.push(unit);
            }
        }
        if format.is_empty() {
            format.extend(Unit::ALL);
        }

        let labels = Unit::ALL.map(|unit| {
            let (singular_attr, plural_attr) = unit.label_attrs();
            let (singular, plural) = unit.default_labels();
            UnitLabel {
                singular: attrs.string_or(singular_attr.name(), singular),
                plural: attrs.string_or(plural_attr.name(), plural),
            }
        });

        Self {
            target: attrs.non_empty(CountdownAttr::Target.name()).and_then(parse_target),
            duration: attrs.parse_or(CountdownAttr::Duration.name(), 0),
            format,
            autostart: attrs.has(CountdownAttr::Autostart.name()),
            expired: attrs.non_empty(CountdownAttr::Expired.name()).map(str::to_string),
            pad: attrs.has(CountdownAttr::Pad.name()),
            show_zero: attrs.has(CountdownAttr::ShowZero.name()),
            unit_class: attrs.non_empty(CountdownAttr::UnitClass.name()).map(str::to_string),
            labels,
        }
    }

    pub fn label(&self, unit: Unit) -> &UnitLabel {
        &self.labels[unit as usize]
    }
}

/// Parse a target instant
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM[:SS]` (read as UTC), a bare
/// date (midnight UTC) or unix seconds.
pub fn parse_target(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CountdownConfig::default();
        assert_eq!(config.target, None);
        assert_eq!(config.duration, 0);
        assert_eq!(config.format.as_slice(), &Unit::ALL);
        assert!(!config.autostart);
        assert_eq!(config.label(Unit::Hours).for_value(1), "hour");
        assert_eq!(config.label(Unit::Hours).for_value(0), "hours");
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let attrs = AttributeMap::from_pairs([
            ("duration", "soon"),
            ("target", "next tuesday"),
            ("format", "weeks,seconds,seconds,Minutes"),
        ]);
        let config = CountdownConfig::from_attributes(&attrs);

        assert_eq!(config.duration, 0);
        assert_eq!(config.target, None);
        assert_eq!(config.format.as_slice(), &[Unit::Seconds, Unit::Minutes]);
    }

    #[test]
    fn test_label_overrides() {
        let attrs = AttributeMap::from_pairs([("label-minute", "min"), ("label-minutes", "mins")]);
        let config = CountdownConfig::from_attributes(&attrs);
        assert_eq!(config.label(Unit::Minutes).for_value(1), "min");
        assert_eq!(config.label(Unit::Minutes).for_value(2), "mins");
        assert_eq!(config.label(Unit::Seconds).for_value(1), "second");
    }

    #[test]
    fn test_target_formats() {
        let expected = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_target("2030-06-01T12:00:00Z"), Some(expected));
        assert_eq!(parse_target("2030-06-01T14:00:00+02:00"), Some(expected));
        assert_eq!(parse_target("2030-06-01T12:00:00"), Some(expected));
        assert_eq!(parse_target("2030-06-01 12:00:00"), Some(expected));
        assert_eq!(parse_target(&expected.timestamp().to_string()), Some(expected));
        assert_eq!(
            parse_target("2030-06-01"),
            Some(Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_target("garbage"), None);
    }
}
