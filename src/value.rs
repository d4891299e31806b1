use std::fmt;
use std::str::FromStr;

/// A runtime value. Strings are owned, so storing a value in a variable is
/// always a deep copy and no two variables share a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    Int(i32),
    String(String),
    Bool(bool),
    #[default]
    None,
}

/// Type tag of a [`Value`]; also the declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    String,
    Bool,
    None,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::String(_) => ValueType::String,
            Value::Bool(_) => ValueType::Bool,
            Value::None => ValueType::None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            Value::None => false,
        }
    }

    /// Integer view used by arithmetic and comparisons. Anything that is not
    /// an integer reads as 0, booleans included.
    pub fn to_int(&self) -> i32 {
        match self {
            Value::Int(n) => *n,
            Value::Bool(_) | Value::String(_) | Value::None => 0,
        }
    }

    /// Returns `self` if it already has type `ty`, otherwise the default of `ty`.
    pub fn coerce_to(self, ty: ValueType) -> Value {
        if ty == ValueType::None || self.value_type() == ty {
            self
        } else {
            ty.default_value()
        }
    }
}

impl ValueType {
    pub fn default_value(self) -> Value {
        match self {
            ValueType::Int => Value::Int(0),
            ValueType::String => Value::String(String::new()),
            ValueType::Bool => Value::Bool(false),
            ValueType::None => Value::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::String => "string",
            ValueType::Bool => "bool",
            ValueType::None => "none",
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    /// Parses a declarable type name. `none` cannot be declared.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ValueType::Int),
            "string" => Ok(ValueType::String),
            "bool" => Ok(ValueType::Bool),
            _ => Err(format!("Unknown type: {}", s)),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders the value the way `print` and string concatenation show it.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::None => Ok(()),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::None.is_truthy());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(-42).to_string(), "-42");
        assert_eq!(Value::from("a\nb").to_string(), "a\nb");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::None.to_string(), "");
    }

    #[test]
    fn test_integer_view() {
        assert_eq!(Value::Int(-3).to_int(), -3);
        assert_eq!(Value::Bool(true).to_int(), 0);
        assert_eq!(Value::from("12").to_int(), 0);
        assert_eq!(Value::None.to_int(), 0);
    }

    #[test]
    fn test_coerce_to_declared_type() {
        assert_eq!(Value::Int(3).coerce_to(ValueType::Int), Value::Int(3));
        assert_eq!(Value::from("3").coerce_to(ValueType::Int), Value::Int(0));
        assert_eq!(Value::Int(1).coerce_to(ValueType::Bool), Value::Bool(false));
        assert_eq!(Value::Bool(true).coerce_to(ValueType::String), Value::from(""));
        assert_eq!(Value::Bool(true).coerce_to(ValueType::None), Value::Bool(true));
    }

    #[test]
    fn test_type_names() {
        assert_eq!("int".parse::<ValueType>(), Ok(ValueType::Int));
        assert_eq!("bool".parse::<ValueType>(), Ok(ValueType::Bool));
        assert!("float".parse::<ValueType>().is_err());
        assert!("none".parse::<ValueType>().is_err());
    }
}
