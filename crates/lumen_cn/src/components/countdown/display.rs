//! Countdown display
//!
//! Turns a number of remaining seconds into the rendered unit list.

use lumen_core::markup::{ClassList, Tag};
use smallvec::SmallVec;

use super::config::{CountdownConfig, Unit};

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_MINUTE: u64 = 60;

/// `remaining` split into units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Breakdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Breakdown {
    pub fn from_secs(remaining: u64) -> Self {
        Self {
            days: remaining / SECS_PER_DAY,
            hours: (remaining % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (remaining % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: remaining % SECS_PER_MINUTE,
        }
    }

    /// Split `remaining` over the configured `units` only
    ///
    /// Larger units missing from `units` fold into the largest configured
    /// one, so `hours` alone shows 25 for a day and an hour. Smaller missing
    /// units are truncated.
    pub fn for_units(remaining: u64, units: &[Unit]) -> Self {
        let mut breakdown = Self::default();
        let mut rest = remaining;
        for unit in Unit::ALL.into_iter().filter(|unit| units.contains(unit)) {
            let size = unit_secs(unit);
            let value = rest / size;
            rest %= size;
            match unit {
                Unit::Days => breakdown.days = value,
                Unit::Hours => breakdown.hours = value,
                Unit::Minutes => breakdown.minutes = value,
                Unit::Seconds => breakdown.seconds = value,
            }
        }
        breakdown
    }

    pub fn get(&self, unit: Unit) -> u64 {
        match unit {
            Unit::Days => self.days,
            Unit::Hours => self.hours,
            Unit::Minutes => self.minutes,
            Unit::Seconds => self.seconds,
        }
    }
}

/// Units to show, in configured order
///
/// Zero-valued units are hidden unless `show_zero` is set, but the last
/// configured unit is kept when everything else was hidden so the display is
/// never blank.
pub fn visible_units(config: &CountdownConfig, breakdown: &Breakdown) -> SmallVec<[Unit; 4]> {
    if config.show_zero {
        return config.format.clone();
    }
    let mut units: SmallVec<[Unit; 4]> = config
        .format
        .iter()
        .copied()
        .filter(|unit| breakdown.get(*unit) != 0)
        .collect();
    if units.is_empty() {
        units.extend(config.format.last().copied());
    }
    units
}

fn unit_secs(unit: Unit) -> u64 {
    match unit {
        Unit::Days => SECS_PER_DAY,
        Unit::Hours => SECS_PER_HOUR,
        Unit::Minutes => SECS_PER_MINUTE,
        Unit::Seconds => 1,
    }
}

fn numeral(value: u64, pad: bool) -> String {
    if pad {
        format!("{:02}", value)
    } else {
        value.to_string()
    }
}

/// Full countdown markup for `remaining`
pub fn render(config: &CountdownConfig, remaining: u64) -> String {
    if remaining == 0 {
        if let Some(expired) = &config.expired {
            return Tag::new("div")
                .class("countdown countdown-expired")
                .attr("role", "timer")
                .raw(expired)
                .build();
        }
    }

    let breakdown = Breakdown::for_units(remaining, &config.format);
    let mut root = Tag::new("div")
        .class("countdown")
        .attr("role", "timer")
        .attr("aria-live", "polite");

    for unit in visible_units(config, &breakdown) {
        let value = breakdown.get(unit);
        let mut classes = ClassList::with("countdown-unit");
        classes.add(&format!("countdown-{}", unit.name()));
        if let Some(extra) = &config.unit_class {
            classes.add(extra);
        }
        root = root.child(
            Tag::new("span")
                .classes(&classes)
                .child(
                    Tag::new("span")
                        .class("countdown-value")
                        .text(&numeral(value, config.pad)),
                )
                .child(
                    Tag::new("span")
                        .class("countdown-label")
                        .text(config.label(unit).for_value(value)),
                ),
        );
    }
    root.build()
}

/// Plain text rendering for terminals and logs
pub fn to_text(config: &CountdownConfig, remaining: u64) -> String {
    if remaining == 0 {
        if let Some(expired) = &config.expired {
            return expired.clone();
        }
    }
    let breakdown = Breakdown::for_units(remaining, &config.format);
    visible_units(config, &breakdown)
        .into_iter()
        .map(|unit| {
            let value = breakdown.get(unit);
            format!(
                "{} {}",
                numeral(value, config.pad),
                config.label(unit).for_value(value)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}
