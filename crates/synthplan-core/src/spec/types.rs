use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target type of a generated column.
///
/// Serialized as its canonical type name (`"int"`, `"decimal(10,2)"`, ...),
/// so plan files can spell types the way SQL dialects do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    /// 8-bit signed integer (byte, tinyint)
    Byte,
    /// 16-bit signed integer (short, smallint)
    Short,
    /// 32-bit signed integer (int, integer)
    Int,
    /// 64-bit signed integer (long, bigint)
    Long,
    /// Single-precision float (float, real)
    Float,
    /// Double-precision float (double)
    Double,
    /// Exact numeric with precision/scale (decimal, numeric)
    Decimal { precision: u8, scale: u8 },
    /// Variable-length string (string, varchar, text)
    String,
    /// Boolean
    Boolean,
    /// Date only
    Date,
    /// Timestamp without timezone
    Timestamp,
}

/// Precision and scale used when `decimal` is written without arguments.
pub const DEFAULT_DECIMAL: DataType = DataType::Decimal {
    precision: 10,
    scale: 0,
};

impl DataType {
    /// Parse a type name such as `"int"`, `"BIGINT"` or `"decimal(19,4)"`.
    ///
    /// Returns `None` for names that are not recognized.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        let normalized = normalized.as_str();

        if let Some(args) = normalized
            .strip_prefix("decimal")
            .or_else(|| normalized.strip_prefix("numeric"))
        {
            return parse_decimal_args(args.trim());
        }

        let dt = match normalized {
            "byte" | "tinyint" => DataType::Byte,
            "short" | "smallint" => DataType::Short,
            "int" | "integer" => DataType::Int,
            "long" | "bigint" => DataType::Long,
            "float" | "real" => DataType::Float,
            "double" | "double precision" => DataType::Double,
            "string" | "varchar" | "text" => DataType::String,
            "bool" | "boolean" => DataType::Boolean,
            "date" => DataType::Date,
            "timestamp" | "datetime" => DataType::Timestamp,
            _ => return None,
        };
        Some(dt)
    }

    /// Integral types sample whole numbers from their range.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            DataType::Byte | DataType::Short | DataType::Int | DataType::Long
        )
    }

    /// Real-valued types sample floating-point numbers from their range.
    pub fn is_real(&self) -> bool {
        matches!(
            self,
            DataType::Float | DataType::Double | DataType::Decimal { .. }
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self, DataType::String)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::Timestamp)
    }

    /// Inclusive value bounds for integral types narrower than 64 bits.
    pub fn integral_bounds(&self) -> Option<(i64, i64)> {
        match self {
            DataType::Byte => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
            DataType::Short => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            DataType::Int => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            _ => None,
        }
    }
}

fn parse_decimal_args(args: &str) -> Option<DataType> {
    if args.is_empty() {
        return Some(DEFAULT_DECIMAL);
    }
    let inner = args.strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(str::trim);
    let precision: u8 = parts.next()?.parse().ok()?;
    let scale: u8 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || precision == 0 || scale > precision {
        return None;
    }
    Some(DataType::Decimal { precision, scale })
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::from_raw(s).ok_or_else(|| format!("unknown column type '{}'", s))
    }
}

impl TryFrom<String> for DataType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Byte => write!(f, "byte"),
            DataType::Short => write!(f, "short"),
            DataType::Int => write!(f, "int"),
            DataType::Long => write!(f, "long"),
            DataType::Float => write!(f, "float"),
            DataType::Double => write!(f, "double"),
            DataType::Decimal { precision, scale } => {
                write!(f, "decimal({},{})", precision, scale)
            }
            DataType::String => write!(f, "string"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Date => write!(f, "date"),
            DataType::Timestamp => write!(f, "timestamp"),
        }
    }
}
