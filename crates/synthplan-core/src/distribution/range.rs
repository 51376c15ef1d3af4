use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::spec::options::Number;
use crate::value::Value;

/// Default window for date/timestamp columns declared without `begin`/`end`.
pub const DEFAULT_BEGIN: &str = "2020-01-01 00:00:00";
pub const DEFAULT_END: &str = "2024-12-31 23:59:59";

/// An inclusive stepped numeric range `min, min + step, ..., <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericRange {
    Int { min: i64, max: i64, step: i64 },
    Float { min: f64, max: f64, step: f64 },
}

impl NumericRange {
    pub fn int(min: i64, max: i64, step: i64) -> Result<Self, String> {
        if min > max {
            return Err(format!("min ({}) must not exceed max ({})", min, max));
        }
        if step <= 0 {
            return Err(format!("step must be positive, got {}", step));
        }
        Ok(NumericRange::Int { min, max, step })
    }

    pub fn float(min: f64, max: f64, step: f64) -> Result<Self, String> {
        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err("range bounds and step must be finite".to_string());
        }
        if min > max {
            return Err(format!("min ({}) must not exceed max ({})", min, max));
        }
        if step <= 0.0 {
            return Err(format!("step must be positive, got {}", step));
        }
        Ok(NumericRange::Float { min, max, step })
    }

    /// Number of grid points in the range, saturating at `u64::MAX`.
    pub fn count(&self) -> u64 {
        match *self {
            NumericRange::Int { min, max, step } => {
                let span = i128::from(max) - i128::from(min);
                (span / i128::from(step) + 1).min(i128::from(u64::MAX)) as u64
            }
            // `as` saturates for counts beyond u64.
            NumericRange::Float { min, max, step } => float_points(min, max, step) as u64,
        }
    }

    /// Grid point selected by a uniform draw:
    /// `min + floor(u * count) * step`, clamped to `[min, max]`.
    pub fn sample_uniform(&self, u: f64) -> Number {
        match *self {
            NumericRange::Int { .. } => {
                let count = self.count();
                let idx = ((u * count as f64).floor() as u64).min(count.saturating_sub(1));
                self.at(u128::from(idx))
            }
            NumericRange::Float { min, max, step } => {
                let points = float_points(min, max, step);
                let idx = (u * points).floor().min(points - 1.0).max(0.0);
                Number::Float((min + idx * step).min(max))
            }
        }
    }

    /// Continuous draw `min + u * (max - min)`, ignoring `step`.
    pub fn sample_continuous(&self, u: f64) -> Number {
        match *self {
            NumericRange::Int { .. } => self.sample_uniform(u),
            NumericRange::Float { min, max, .. } => Number::Float(min + u * (max - min)),
        }
    }

    /// Grid point selected by an ordinal, cycling through the range.
    pub fn sample_ordinal(&self, ordinal: i64) -> Number {
        match *self {
            NumericRange::Float { min, max, step } if float_points(min, max, step) > EXACT_F64_INT => {
                let idx = (ordinal as f64).rem_euclid(float_points(min, max, step));
                Number::Float((min + idx * step).min(max))
            }
            _ => {
                let count = i128::from(self.count()).max(1);
                let idx = i128::from(ordinal).rem_euclid(count);
                self.at(idx as u128)
            }
        }
    }

    fn at(&self, idx: u128) -> Number {
        match *self {
            NumericRange::Int { min, max, step } => {
                let v = i128::from(min) + idx as i128 * i128::from(step);
                Number::Int(v.min(i128::from(max)) as i64)
            }
            NumericRange::Float { min, max, step } => {
                Number::Float((min + idx as f64 * step).min(max))
            }
        }
    }
}

/// Largest integer below which every integer is exact in an `f64`.
const EXACT_F64_INT: f64 = 9_007_199_254_740_992.0;

/// Grid point count of a real range, kept in `f64` so wide ranges neither
/// overflow nor collapse.
fn float_points(min: f64, max: f64, step: f64) -> f64 {
    // Tolerance absorbs representation error such as 0.3 / 0.1.
    ((max - min) / step + 1e-9).floor() + 1.0
}

impl std::fmt::Display for NumericRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericRange::Int { min, max, step } => write!(f, "{}..={} step {}", min, max, step),
            NumericRange::Float { min, max, step } => write!(f, "{}..={} step {}", min, max, step),
        }
    }
}

/// A date or timestamp range, compiled to a stepped range of second offsets
/// from `begin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalRange {
    pub begin: NaiveDateTime,
    pub offsets: NumericRange,
    pub date_only: bool,
}

impl TemporalRange {
    pub fn new(
        begin: Option<&str>,
        end: Option<&str>,
        interval: Option<&str>,
        date_only: bool,
    ) -> Result<Self, String> {
        let begin = parse_datetime(begin.unwrap_or(DEFAULT_BEGIN))?;
        let end = parse_datetime(end.unwrap_or(DEFAULT_END))?;
        if end < begin {
            return Err(format!("end ({}) is before begin ({})", end, begin));
        }
        let default_interval = if date_only { "1 day" } else { "1 minute" };
        let step = parse_interval(interval.unwrap_or(default_interval))?;
        let step_secs = step.num_seconds();
        if date_only && step_secs % 86_400 != 0 {
            return Err(format!(
                "interval for a date column must be a whole number of days, got {} seconds",
                step_secs
            ));
        }
        let span = (end - begin).num_seconds();
        Ok(Self {
            begin,
            offsets: NumericRange::int(0, span, step_secs)?,
            date_only,
        })
    }

    /// Convert a sampled offset back into a date or timestamp value.
    pub fn value_at(&self, offset: Number) -> Value {
        let secs = match offset {
            Number::Int(i) => i,
            Number::Float(f) => f.floor() as i64,
        };
        let ts = self.begin + Duration::seconds(secs);
        if self.date_only {
            Value::Date(ts.date())
        } else {
            Value::Timestamp(ts)
        }
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime, String> {
    let text = text.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| format!("cannot parse '{}' as a date or timestamp", text))
}

/// Parse an interval such as `"1 day"`, `"15 minutes"` or `"2 weeks"`.
pub fn parse_interval(text: &str) -> Result<Duration, String> {
    let mut parts = text.split_whitespace();
    let (Some(amount), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!(
            "interval '{}' must look like '<n> days|hours|minutes|seconds|weeks'",
            text
        ));
    };
    let amount: i64 = amount
        .parse()
        .map_err(|_| format!("interval amount '{}' is not an integer", amount))?;
    if amount <= 0 {
        return Err(format!("interval must be positive, got '{}'", text));
    }
    let duration = match unit.to_lowercase().trim_end_matches('s') {
        "week" => Duration::try_weeks(amount),
        "day" => Duration::try_days(amount),
        "hour" => Duration::try_hours(amount),
        "minute" | "min" => Duration::try_minutes(amount),
        "second" | "sec" => Duration::try_seconds(amount),
        other => return Err(format!("unknown interval unit '{}'", other)),
    };
    duration.ok_or_else(|| format!("interval '{}' is out of range", text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_range_rejects_bad_bounds() {
        assert!(NumericRange::int(5, 1, 1).is_err());
        assert!(NumericRange::int(1, 5, 0).is_err());
        assert!(NumericRange::int(1, 5, -2).is_err());
        assert!(NumericRange::int(3, 3, 1).is_ok());
    }

    #[test]
    fn test_int_count_and_grid() {
        let r = NumericRange::int(10, 20, 3).unwrap();
        // 10, 13, 16, 19
        assert_eq!(r.count(), 4);
        assert_eq!(r.sample_uniform(0.0), Number::Int(10));
        assert_eq!(r.sample_uniform(0.999_999), Number::Int(19));
        assert_eq!(r.sample_ordinal(5), Number::Int(13));
        assert_eq!(r.sample_ordinal(-1), Number::Int(19));
    }

    #[test]
    fn test_uniform_samples_stay_on_grid() {
        let r = NumericRange::int(-7, 50, 4).unwrap();
        for i in 0..1000 {
            let u = i as f64 / 1000.0;
            let Number::Int(v) = r.sample_uniform(u) else {
                panic!("expected integer sample");
            };
            assert!((-7..=50).contains(&v));
            assert_eq!((v + 7) % 4, 0);
        }
    }

    #[test]
    fn test_float_range() {
        let r = NumericRange::float(0.0, 0.3, 0.1).unwrap();
        assert_eq!(r.count(), 4);
        let Number::Float(top) = r.sample_uniform(0.99) else {
            panic!("expected float sample");
        };
        assert!((top - 0.3).abs() < 1e-9);
        let Number::Float(c) = r.sample_continuous(0.5) else {
            panic!("expected float sample");
        };
        assert!((c - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_temporal_range_dates() {
        let r = TemporalRange::new(Some("2024-01-01"), Some("2024-01-10"), Some("1 day"), true)
            .unwrap();
        assert_eq!(r.offsets.count(), 10);
        let last = r.value_at(r.offsets.sample_uniform(0.999));
        assert_eq!(
            last,
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        );
    }

    #[test]
    fn test_temporal_range_errors() {
        assert!(TemporalRange::new(Some("2024-02-01"), Some("2024-01-01"), None, true).is_err());
        assert!(TemporalRange::new(None, None, Some("90 minutes"), true).is_err());
        assert!(TemporalRange::new(Some("yesterday"), None, None, false).is_err());
    }

    #[test]
    fn test_parse_interval_units() {
        assert_eq!(parse_interval("1 day").unwrap(), Duration::days(1));
        assert_eq!(parse_interval("15 minutes").unwrap(), Duration::minutes(15));
        assert_eq!(parse_interval("2 Weeks").unwrap(), Duration::weeks(2));
        assert!(parse_interval("0 days").is_err());
        assert!(parse_interval("days").is_err());
        assert!(parse_interval("3 fortnights").is_err());
    }

    #[test]
    fn test_oversized_interval_is_an_error() {
        let err = parse_interval("9999999999999999 weeks").unwrap_err();
        assert!(err.contains("out of range"), "{}", err);
        assert!(parse_interval("9223372036854775807 seconds").is_err());
        assert!(TemporalRange::new(
            Some("2020-01-01"),
            Some("2024-01-01"),
            Some("9999999999999999 weeks"),
            true
        )
        .is_err());
    }

    #[test]
    fn test_wide_float_range_spreads_samples() {
        let r = NumericRange::float(0.0, 1e20, 1.0).unwrap();
        assert_eq!(r.count(), u64::MAX);

        let Number::Float(mid) = r.sample_uniform(0.5) else {
            panic!("expected float sample");
        };
        assert!((mid - 5e19).abs() < 1e6, "{}", mid);
        let Number::Float(top) = r.sample_uniform(0.999_999_999) else {
            panic!("expected float sample");
        };
        assert!(top > 9.9e19 && top <= 1e20, "{}", top);
        assert_eq!(r.sample_uniform(0.0), Number::Float(0.0));

        assert_eq!(r.sample_ordinal(7), Number::Float(7.0));
        let Number::Float(wrapped) = r.sample_ordinal(-1) else {
            panic!("expected float sample");
        };
        assert!((0.0..=1e20).contains(&wrapped));
    }
}
