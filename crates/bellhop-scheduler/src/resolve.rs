//! Time expression resolution — human input to an absolute future instant.
//!
//! Accepts either a relative duration ("10 minutes", "2 hours", "90m") or a
//! clock-time expression ("5:30 pm", "17:30", "tomorrow 8am"). Clock times
//! are interpreted in the resolver's timezone against the supplied "now";
//! a clock time that has already passed today rolls forward exactly 24 hours,
//! once. Output is always normalized to UTC.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use bellhop_core::error::{BellhopError, Result};

/// Accepted clock-time layouts, tried in order.
const TIME_FORMATS: &[&str] = &[
    "%I:%M %p", // 5:30 pm
    "%I:%M%p",  // 5:30pm
    "%I %p",    // 8 am
    "%I%p",     // 8am
    "%H:%M:%S", // 17:30:00
    "%H:%M",    // 17:30
];

/// Parses human time expressions into absolute UTC instants.
#[derive(Debug, Clone, Copy)]
pub struct TimeResolver {
    tz: Tz,
}

impl TimeResolver {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The timezone clock-time expressions are interpreted in.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Resolve an expression against `now`. The result is strictly in the
    /// future for durations by construction, and for clock times by the
    /// 24-hour rollover rule. Unrecognized input is a `Parse` error; nothing
    /// is guessed or partially resolved.
    pub fn resolve(&self, expr: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let lower = expr.trim().to_ascii_lowercase();
        if lower.is_empty() {
            return Err(BellhopError::Parse(expr.to_string()));
        }
        let lower = lower.strip_prefix("in ").unwrap_or(&lower);

        if let Some(delta) = parse_duration(lower) {
            // A parseable duration can still overflow the representable
            // instant range; that is a rejection, not a panic.
            return now
                .checked_add_signed(delta)
                .ok_or_else(|| BellhopError::Parse(expr.to_string()));
        }
        self.resolve_clock_time(lower, now)
            .ok_or_else(|| BellhopError::Parse(expr.to_string()))
    }

    fn resolve_clock_time(&self, expr: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let (day_offset, time_part) = if let Some(rest) = expr.strip_prefix("tomorrow") {
            (1, rest.trim_start())
        } else if let Some(rest) = expr.strip_prefix("today") {
            (0, rest.trim_start())
        } else {
            (0, expr)
        };

        let time = parse_time(time_part)?;
        let local_now = now.with_timezone(&self.tz);
        let local_date = local_now.date_naive() + Duration::days(day_offset);

        let candidate = match self.tz.from_local_datetime(&local_date.and_time(time)) {
            chrono::LocalResult::Single(dt) => dt,
            // DST fall-back repeats the wall time; take the earlier instant
            chrono::LocalResult::Ambiguous(earlier, _) => earlier,
            // DST spring-forward gap: the wall time does not exist
            chrono::LocalResult::None => return None,
        }
        .with_timezone(&Utc);

        // Rollover: an already-passed clock time means the next day,
        // exactly one 24-hour push, never more.
        if candidate <= now {
            Some(candidate + Duration::hours(24))
        } else {
            Some(candidate)
        }
    }
}

fn parse_duration(expr: &str) -> Option<Duration> {
    // humantime wants "10minutes", not "10 minutes"
    let compact: String = expr.split_whitespace().collect();
    let std_dur = humantime::parse_duration(&compact).ok()?;
    Duration::from_std(std_dur).ok()
}

fn parse_time(expr: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(expr, fmt).ok())
}
