//! Date filter model and the shared interval resolution rule.
//!
//! # Responsibility
//! - Parse absolute and relative date tokens picked in the date selector.
//! - Derive the time-bucket granularity for a `(date_from, date_to)` pair.
//!
//! # Invariants
//! - `DateFilter::interval` is always derived from its bounds; there is no
//!   setter for it.
//! - Resolution never fails: unresolvable input degrades to `Interval::Day`.
//! - Hour granularity is not modelled; presets that would pick it use `Day`.

use crate::model::query::DateRange;
use chrono::{Datelike, Duration, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RELATIVE_OFFSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-(\d{1,5})([hdwmqy])(Start|End)?$").expect("valid relative offset regex")
});
static PERIOD_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([dwmqy])Start$").expect("valid period start regex"));

/// Spans up to this many days bucket by day.
const DAY_INTERVAL_MAX_SPAN_DAYS: i64 = 60;
/// Spans up to this many days bucket by week; anything longer by month.
const WEEK_INTERVAL_MAX_SPAN_DAYS: i64 = 120;

/// Well-known selector presets and the interval each one implies.
const INTERVAL_PRESETS: &[(Option<&str>, Option<&str>, Interval)] = &[
    (Some("dStart"), None, Interval::Day),
    (Some("-1dStart"), Some("-1dEnd"), Interval::Day),
    (Some("-24h"), None, Interval::Day),
    (Some("-48h"), None, Interval::Day),
    (Some("-7d"), None, Interval::Day),
    (Some("-14d"), None, Interval::Day),
    (Some("-30d"), None, Interval::Day),
    (Some("-90d"), None, Interval::Week),
    (Some("-180d"), None, Interval::Month),
    (Some("mStart"), None, Interval::Day),
    (Some("-1mStart"), Some("-1mEnd"), Interval::Day),
    (Some("yStart"), None, Interval::Month),
    (Some("all"), None, Interval::Month),
];

/// Time-bucket granularity of a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Day,
    Week,
    Month,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// Calendar unit used by relative date tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl DateUnit {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "h" => Some(Self::Hour),
            "d" => Some(Self::Day),
            "w" => Some(Self::Week),
            "m" => Some(Self::Month),
            "q" => Some(Self::Quarter),
            "y" => Some(Self::Year),
            _ => None,
        }
    }
}

/// Snaps a relative date to the start or end of its enclosing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodAnchor {
    Start,
    End,
}

/// Parsed form of one date bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    /// `YYYY-MM-DD` or an ISO datetime (date part only).
    Absolute(NaiveDate),
    /// `-<amount><unit>[Start|End]`, e.g. `-7d` or `-1mStart`.
    Relative {
        amount: u32,
        unit: DateUnit,
        anchor: Option<PeriodAnchor>,
    },
    /// `dStart`, `wStart`, `mStart`, `qStart`, `yStart`.
    PeriodStart(DateUnit),
    /// `all`: beginning of recorded time.
    AllTime,
}

impl DateToken {
    /// Parses one raw date bound. Returns `None` for anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        if value == "all" {
            return Some(Self::AllTime);
        }

        if let Some(captures) = PERIOD_START_RE.captures(value) {
            return DateUnit::from_code(&captures[1]).map(Self::PeriodStart);
        }

        if let Some(captures) = RELATIVE_OFFSET_RE.captures(value) {
            let amount = captures[1].parse::<u32>().ok()?;
            let unit = DateUnit::from_code(&captures[2])?;
            let anchor = captures.get(3).map(|m| match m.as_str() {
                "Start" => PeriodAnchor::Start,
                _ => PeriodAnchor::End,
            });
            return Some(Self::Relative {
                amount,
                unit,
                anchor,
            });
        }

        let date_part = value.get(..10)?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .ok()
            .filter(|_| value.len() == 10 || value[10..].starts_with(['T', ' ']))
            .map(Self::Absolute)
    }

    /// Resolves this token to a calendar date relative to `today`.
    ///
    /// `AllTime` has no calendar date and resolves to `None`.
    pub fn resolve(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Absolute(date) => Some(date),
            Self::AllTime => None,
            Self::PeriodStart(unit) => period_start(today, unit),
            Self::Relative {
                amount,
                unit,
                anchor,
            } => {
                let shifted = shift_back(today, amount, unit)?;
                match anchor {
                    None => Some(shifted),
                    Some(PeriodAnchor::Start) => period_start(shifted, unit),
                    Some(PeriodAnchor::End) => period_end(shifted, unit),
                }
            }
        }
    }
}

/// Date range filter applied to every dashboard query.
///
/// Bounds keep the raw token the user picked so relative ranges stay
/// relative across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFilter {
    date_from: Option<String>,
    date_to: Option<String>,
    interval: Interval,
}

impl DateFilter {
    /// Builds a filter, deriving `interval` from the bounds.
    pub fn new(date_from: Option<String>, date_to: Option<String>, today: NaiveDate) -> Self {
        let interval = resolve_interval(date_from.as_deref(), date_to.as_deref(), today);
        Self {
            date_from,
            date_to,
            interval,
        }
    }

    pub fn date_from(&self) -> Option<&str> {
        self.date_from.as_deref()
    }

    pub fn date_to(&self) -> Option<&str> {
        self.date_to.as_deref()
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Wire projection used by every compiled query.
    pub fn date_range(&self) -> DateRange {
        DateRange {
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
        }
    }
}

/// Derives the granularity for a date range.
///
/// Presets win first. Otherwise the span between the resolved bounds
/// decides, with an open `date_to` meaning `today`.
pub fn resolve_interval(
    date_from: Option<&str>,
    date_to: Option<&str>,
    today: NaiveDate,
) -> Interval {
    if let Some(interval) = preset_interval(date_from, date_to) {
        return interval;
    }

    let Some(from_token) = date_from.and_then(DateToken::parse) else {
        return Interval::Day;
    };
    if from_token == DateToken::AllTime {
        return Interval::Month;
    }
    let Some(from) = from_token.resolve(today) else {
        return Interval::Day;
    };

    let to = match date_to {
        None => today,
        Some(raw) => match DateToken::parse(raw).and_then(|token| token.resolve(today)) {
            Some(date) => date,
            None => return Interval::Day,
        },
    };

    let span_days = (to - from).num_days().abs();
    if span_days <= DAY_INTERVAL_MAX_SPAN_DAYS {
        Interval::Day
    } else if span_days <= WEEK_INTERVAL_MAX_SPAN_DAYS {
        Interval::Week
    } else {
        Interval::Month
    }
}

fn preset_interval(date_from: Option<&str>, date_to: Option<&str>) -> Option<Interval> {
    INTERVAL_PRESETS
        .iter()
        .find(|(from, to, _)| *from == date_from && *to == date_to)
        .map(|(_, _, interval)| *interval)
}

fn shift_back(date: NaiveDate, amount: u32, unit: DateUnit) -> Option<NaiveDate> {
    match unit {
        DateUnit::Hour => date.checked_sub_signed(Duration::days(i64::from(amount.div_ceil(24)))),
        DateUnit::Day => date.checked_sub_signed(Duration::days(i64::from(amount))),
        DateUnit::Week => date.checked_sub_signed(Duration::weeks(i64::from(amount))),
        DateUnit::Month => date.checked_sub_months(Months::new(amount)),
        DateUnit::Quarter => date.checked_sub_months(Months::new(amount.checked_mul(3)?)),
        DateUnit::Year => date.checked_sub_months(Months::new(amount.checked_mul(12)?)),
    }
}

fn period_start(date: NaiveDate, unit: DateUnit) -> Option<NaiveDate> {
    match unit {
        DateUnit::Hour | DateUnit::Day => Some(date),
        DateUnit::Week => date.checked_sub_signed(Duration::days(i64::from(
            date.weekday().num_days_from_monday(),
        ))),
        DateUnit::Month => date.with_day(1),
        DateUnit::Quarter => {
            let first_month = (date.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), first_month, 1)
        }
        DateUnit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
    }
}

fn period_end(date: NaiveDate, unit: DateUnit) -> Option<NaiveDate> {
    let length = match unit {
        DateUnit::Hour | DateUnit::Day => return Some(date),
        DateUnit::Week => {
            return period_start(date, unit)?.checked_add_signed(Duration::days(6));
        }
        DateUnit::Month => Months::new(1),
        DateUnit::Quarter => Months::new(3),
        DateUnit::Year => Months::new(12),
    };
    period_start(date, unit)?
        .checked_add_months(length)?
        .pred_opt()
}
