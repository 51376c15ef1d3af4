//! Post-sampling shaping: casting to the declared type and text decoration.

use chrono::NaiveTime;

use crate::spec::types::DataType;
use crate::value::Value;

/// Convert a sampled value to the column's declared type.
///
/// Narrow integral types wrap around on overflow, reals are rounded to the
/// precision of their type and strings take the value's display form.
/// A `float` column therefore sits on its `step` grid only to `f32`
/// precision.
/// Values that have no sensible conversion become null.
pub fn cast(value: Value, data_type: DataType) -> Value {
    if value.is_null() {
        return value;
    }
    if let Value::Array(items) = value {
        return Value::Array(items.into_iter().map(|v| cast(v, data_type)).collect());
    }

    match data_type {
        DataType::Byte | DataType::Short | DataType::Int | DataType::Long => {
            match integral(&value) {
                Some(i) => Value::Int(wrap(i, data_type)),
                None => Value::Null,
            }
        }
        DataType::Float => match real(&value) {
            Some(f) => Value::Float(f64::from(f as f32)),
            None => Value::Null,
        },
        DataType::Double => match real(&value) {
            Some(f) => Value::Float(f),
            None => Value::Null,
        },
        DataType::Decimal { scale, .. } => match real(&value) {
            Some(f) => Value::Float(round_to_scale(f, scale)),
            None => Value::Null,
        },
        DataType::String => match value {
            Value::String(_) => value,
            other => Value::string(other.to_string()),
        },
        DataType::Boolean => match value {
            Value::Bool(_) => value,
            Value::Int(i) => Value::Bool(i != 0),
            Value::Float(f) => Value::Bool(f != 0.0),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "t" | "1" | "yes" => Value::Bool(true),
                "false" | "f" | "0" | "no" => Value::Bool(false),
                _ => Value::Null,
            },
            _ => Value::Null,
        },
        DataType::Date => match value {
            Value::Date(_) => value,
            Value::Timestamp(ts) => Value::Date(ts.date()),
            _ => Value::Null,
        },
        DataType::Timestamp => match value {
            Value::Timestamp(_) => value,
            Value::Date(d) => Value::Timestamp(d.and_time(NaiveTime::MIN)),
            _ => Value::Null,
        },
    }
}

fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn real(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn wrap(i: i64, data_type: DataType) -> i64 {
    match data_type {
        DataType::Byte => i64::from(i as i8),
        DataType::Short => i64::from(i as i16),
        DataType::Int => i64::from(i as i32),
        _ => i,
    }
}

fn round_to_scale(f: f64, scale: u8) -> f64 {
    let factor = 10f64.powi(i32::from(scale));
    (f * factor).round() / factor
}

/// Largest width or precision a format conversion may ask for.
pub const MAX_FORMAT_WIDTH: usize = 1024;

/// A single-conversion printf-style format such as `"ITEM-%05d"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    source: String,
    head: String,
    spec: Conversion,
    tail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    /// `%d`, `%5d`, `%05d`
    Decimal { width: usize, zero_pad: bool },
    /// `%x`, `%08x`
    Hex { width: usize, zero_pad: bool },
    /// `%.2f`
    Fixed { precision: usize },
    /// `%s`
    Text,
}

impl Format {
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut head = String::new();
        let mut tail = String::new();
        let mut spec = None;
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            let target = if spec.is_some() { &mut tail } else { &mut head };
            if c != '%' {
                target.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                target.push('%');
                continue;
            }
            if spec.is_some() {
                return Err(format!(
                    "format '{}' has more than one conversion",
                    source
                ));
            }

            let mut flags = String::new();
            let conversion = loop {
                match chars.next() {
                    Some(ch) if ch.is_ascii_digit() || ch == '.' => flags.push(ch),
                    Some(ch) => break ch,
                    None => return Err(format!("format '{}' ends inside a conversion", source)),
                }
            };
            spec = Some(
                parse_conversion(&flags, conversion)
                    .map_err(|e| format!("{} in format '{}'", e, source))?,
            );
        }

        let spec = spec.ok_or_else(|| format!("format '{}' has no conversion", source))?;
        Ok(Self {
            source: source.to_string(),
            head,
            spec,
            tail,
        })
    }

    pub fn apply(&self, value: &Value) -> String {
        let body = match self.spec {
            Conversion::Decimal { width, zero_pad } => {
                let n = integral(value).unwrap_or(0);
                if zero_pad {
                    format!("{:0width$}", n, width = width)
                } else {
                    format!("{:width$}", n, width = width)
                }
            }
            Conversion::Hex { width, zero_pad } => {
                let n = integral(value).unwrap_or(0);
                if zero_pad {
                    format!("{:0width$x}", n, width = width)
                } else {
                    format!("{:width$x}", n, width = width)
                }
            }
            Conversion::Fixed { precision } => {
                let f = real(value).unwrap_or(0.0);
                format!("{:.precision$}", f, precision = precision)
            }
            Conversion::Text => value.to_string(),
        };
        format!("{}{}{}", self.head, body, self.tail)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

fn parse_conversion(flags: &str, conversion: char) -> Result<Conversion, String> {
    let unsupported = || format!("unsupported conversion '%{}{}'", flags, conversion);
    let bounded = |digits: &str| -> Result<usize, String> {
        let n: usize = digits.parse().map_err(|_| unsupported())?;
        if n > MAX_FORMAT_WIDTH {
            return Err(format!(
                "width or precision {} in '%{}{}' exceeds {}",
                n, flags, conversion, MAX_FORMAT_WIDTH
            ));
        }
        Ok(n)
    };

    match conversion {
        'd' | 'i' | 'x' => {
            if flags.contains('.') {
                return Err(unsupported());
            }
            let zero_pad = flags.starts_with('0') && flags.len() > 1;
            let width = if flags.is_empty() { 0 } else { bounded(flags)? };
            if conversion == 'x' {
                Ok(Conversion::Hex { width, zero_pad })
            } else {
                Ok(Conversion::Decimal { width, zero_pad })
            }
        }
        'f' => {
            if flags.is_empty() {
                return Ok(Conversion::Fixed { precision: 6 });
            }
            let digits = flags.strip_prefix('.').ok_or_else(unsupported)?;
            Ok(Conversion::Fixed {
                precision: bounded(digits)?,
            })
        }
        's' if flags.is_empty() => Ok(Conversion::Text),
        _ => Err(unsupported()),
    }
}

/// Text decoration for string columns derived from numeric values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shaping {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub separator: String,
    pub format: Option<Format>,
}

impl Shaping {
    /// Format the raw value, then wrap it with prefix and suffix.
    pub fn apply(&self, value: Value) -> Value {
        if value.is_null() {
            return value;
        }
        let mut text = match &self.format {
            Some(format) => format.apply(&value),
            None => value.to_string(),
        };
        if let Some(prefix) = &self.prefix {
            text = format!("{}{}{}", prefix, self.separator, text);
        }
        if let Some(suffix) = &self.suffix {
            text = format!("{}{}{}", text, self.separator, suffix);
        }
        Value::string(text)
    }
}

impl std::fmt::Display for Shaping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(format) = &self.format {
            parts.push(format!("format '{}'", format.source()));
        }
        if let Some(prefix) = &self.prefix {
            parts.push(format!("prefix '{}'", prefix));
        }
        if let Some(suffix) = &self.suffix {
            parts.push(format!("suffix '{}'", suffix));
        }
        if self.prefix.is_some() || self.suffix.is_some() {
            parts.push(format!("sep '{}'", self.separator));
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_wraps_narrow_integers() {
        assert_eq!(cast(Value::Int(130), DataType::Byte), Value::Int(-126));
        assert_eq!(cast(Value::Int(70_000), DataType::Short), Value::Int(4_464));
        assert_eq!(cast(Value::Int(70_000), DataType::Long), Value::Int(70_000));
        assert_eq!(cast(Value::Float(3.9), DataType::Int), Value::Int(3));
    }

    #[test]
    fn test_cast_decimal_rounds_to_scale() {
        let dt = DataType::Decimal {
            precision: 10,
            scale: 2,
        };
        assert_eq!(cast(Value::Float(3.14159), dt), Value::Float(3.14));
    }

    #[test]
    fn test_cast_to_string_and_boolean() {
        assert_eq!(cast(Value::Int(42), DataType::String), Value::string("42"));
        assert_eq!(cast(Value::Int(0), DataType::Boolean), Value::Bool(false));
        assert_eq!(cast(Value::Int(1), DataType::Boolean), Value::Bool(true));
        assert_eq!(cast(Value::Null, DataType::Int), Value::Null);
        assert_eq!(cast(Value::string("abc"), DataType::Int), Value::Null);
    }

    #[test]
    fn test_format_conversions() {
        let f = Format::parse("ITEM-%05d").unwrap();
        assert_eq!(f.apply(&Value::Int(42)), "ITEM-00042");
        let f = Format::parse("%4d|").unwrap();
        assert_eq!(f.apply(&Value::Int(7)), "   7|");
        let f = Format::parse("%.2f%%").unwrap();
        assert_eq!(f.apply(&Value::Float(1.005_1)), "1.01%");
        let f = Format::parse("0x%x").unwrap();
        assert_eq!(f.apply(&Value::Int(255)), "0xff");
        let f = Format::parse("<%s>").unwrap();
        assert_eq!(f.apply(&Value::string("a")), "<a>");
    }

    #[test]
    fn test_format_rejects_bad_patterns() {
        assert!(Format::parse("no conversion").is_err());
        assert!(Format::parse("%d and %d").is_err());
        assert!(Format::parse("%q").is_err());
        assert!(Format::parse("%5").is_err());
        assert!(Format::parse("%.2d").is_err());
        assert!(Format::parse("ID-%1025d").is_err());
    }

    #[test]
    fn test_format_width_is_bounded() {
        let err = Format::parse("%999999999999d").unwrap_err();
        assert!(err.contains("exceeds"), "{}", err);
        assert!(Format::parse("%.5000f").is_err());
        assert!(Format::parse("%02000x").is_err());
        assert!(Format::parse("%99999999999999999999999d").is_err());

        let f = Format::parse("%01024d").unwrap();
        assert_eq!(f.apply(&Value::Int(1)).len(), 1024);
    }

    #[test]
    fn test_shaping_formats_then_wraps() {
        let shaping = Shaping {
            prefix: Some("ord".to_string()),
            suffix: Some("x".to_string()),
            separator: "-".to_string(),
            format: Some(Format::parse("%03d").unwrap()),
        };
        assert_eq!(shaping.apply(Value::Int(7)), Value::string("ord-007-x"));
        assert_eq!(shaping.apply(Value::Null), Value::Null);
    }
}
