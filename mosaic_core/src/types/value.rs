use crate::error::ConversionError;
use crate::types::column::ColumnType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// A single column value as produced by a backend row or bound as a parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Double(f64),
    /// Exact numeric kept in its textual form.
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Decimal(v) | Value::Text(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "{}", String::from_utf8_lossy(v)),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Decimal(v) => v.parse().ok(),
            _ => None,
        }
    }

    fn text(&self) -> Option<String> {
        match self {
            Value::Bytes(v) => String::from_utf8(v.clone()).ok(),
            other => Some(other.to_string()),
        }
    }

    /// Converts the value into the representation declared by `target`.
    ///
    /// NULL converts to NULL for every target.
    pub fn coerce(&self, target: ColumnType) -> Result<Value, ConversionError> {
        let fail = || ConversionError::new(self.clone(), target);
        if self.is_null() || target == ColumnType::Null {
            return Ok(Value::Null);
        }
        if target.is_integer() {
            return match self {
                Value::Int(_) | Value::UInt(_) => Ok(self.clone()),
                // i64::MIN is exactly representable, i64::MAX rounds up to 2^63
                Value::Double(v)
                    if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
                {
                    Ok(Value::Int(*v as i64))
                }
                Value::Double(_) => Err(fail()),
                other => {
                    let text = other.text().ok_or_else(fail)?;
                    let text = text.trim();
                    text.parse::<i64>()
                        .map(Value::Int)
                        .or_else(|_| text.parse::<u64>().map(Value::UInt))
                        .map_err(|_| fail())
                }
            };
        }
        if target.is_floating() {
            return match self.as_f64() {
                Some(v) => Ok(Value::Double(v)),
                None => self
                    .text()
                    .and_then(|t| t.trim().parse::<f64>().ok())
                    .map(Value::Double)
                    .ok_or_else(fail),
            };
        }
        if target.is_decimal() {
            return match self {
                Value::Decimal(_) => Ok(self.clone()),
                Value::Int(_) | Value::UInt(_) | Value::Double(_) => {
                    Ok(Value::Decimal(self.to_string()))
                }
                other => {
                    let text = other.text().ok_or_else(fail)?;
                    let text = text.trim();
                    text.parse::<f64>()
                        .map(|_| Value::Decimal(text.to_string()))
                        .map_err(|_| fail())
                }
            };
        }
        if target.is_binary() {
            return Ok(match self {
                Value::Bytes(_) => self.clone(),
                other => Value::Bytes(other.to_string().into_bytes()),
            });
        }
        self.text().map(Value::Text).ok_or_else(fail)
    }

    /// Total order used when merging sorted shard streams.
    ///
    /// NULL sorts first; numeric values compare across representations;
    /// incomparable pairs are treated as equal.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::UInt(a), Value::UInt(b)) => a.cmp(b),
            (Value::Int(a), Value::UInt(b)) => {
                u64::try_from(*a).map_or(Ordering::Less, |a| a.cmp(b))
            }
            (Value::UInt(a), Value::Int(b)) => {
                u64::try_from(*b).map_or(Ordering::Greater, |b| a.cmp(&b))
            }
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        }
    }
}
