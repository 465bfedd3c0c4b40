use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ParamType
// ---------------------------------------------------------------------------

/// Java-side type of an action parameter or a component method parameter.
/// Anything outside the primitive set is carried through as an opaque
/// type name (`Other`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    Int,
    Long,
    Double,
    Boolean,
    Other(String),
}

impl ParamType {
    pub fn java_name(&self) -> &str {
        match self {
            ParamType::Int => "int",
            ParamType::Long => "long",
            ParamType::Double => "double",
            ParamType::Boolean => "boolean",
            ParamType::Other(name) => name,
        }
    }

    /// The functional-interface type a command factory declares when a
    /// parameter is supplied lazily. Primitives have dedicated supplier
    /// interfaces; everything else uses the generic one.
    pub fn supplier_name(&self) -> String {
        match self {
            ParamType::Int => "IntSupplier".to_string(),
            ParamType::Long => "LongSupplier".to_string(),
            ParamType::Double => "DoubleSupplier".to_string(),
            ParamType::Boolean => "BooleanSupplier".to_string(),
            ParamType::Other(name) => format!("Supplier<{name}>"),
        }
    }

    /// The accessor method paired with `supplier_name`.
    pub fn supplier_getter(&self) -> &'static str {
        match self {
            ParamType::Int => "getAsInt",
            ParamType::Long => "getAsLong",
            ParamType::Double => "getAsDouble",
            ParamType::Boolean => "getAsBoolean",
            ParamType::Other(_) => "get",
        }
    }
}

impl Default for ParamType {
    fn default() -> Self {
        ParamType::Double
    }
}

impl From<&str> for ParamType {
    fn from(s: &str) -> Self {
        match s {
            "int" => ParamType::Int,
            "long" => ParamType::Long,
            "double" => ParamType::Double,
            "boolean" => ParamType::Boolean,
            other => ParamType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.java_name())
    }
}

impl Serialize for ParamType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.java_name())
    }
}

impl<'de> Deserialize<'de> for ParamType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ParamType::from(s.as_str()))
    }
}

// ---------------------------------------------------------------------------
// InvocationType
// ---------------------------------------------------------------------------

/// How a command supplies one of its action's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationType {
    Hardcode,
    PassthroughValue,
    PassthroughSupplier,
}

impl InvocationType {
    pub fn as_str(self) -> &'static str {
        match self {
            InvocationType::Hardcode => "hardcode",
            InvocationType::PassthroughValue => "passthrough_value",
            InvocationType::PassthroughSupplier => "passthrough_supplier",
        }
    }
}

impl fmt::Display for InvocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EndCondition
// ---------------------------------------------------------------------------

/// Lifecycle of an atomic command: one instantaneous effect, run until
/// interrupted, or run until a state predicate becomes true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCondition {
    Once,
    Forever,
    State(Uuid),
}

impl fmt::Display for EndCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndCondition::Once => f.write_str("once"),
            EndCondition::Forever => f.write_str("forever"),
            EndCondition::State(id) => write!(f, "{id}"),
        }
    }
}

impl std::str::FromStr for EndCondition {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(EndCondition::Once),
            "forever" => Ok(EndCondition::Forever),
            other => Uuid::parse_str(other)
                .map(EndCondition::State)
                .map_err(|_| crate::error::CoreError::InvalidEndCondition(other.to_string())),
        }
    }
}

impl Serialize for EndCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EndCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ParallelEnd
// ---------------------------------------------------------------------------

/// When a parallel group finishes: when every child has, when the first
/// child has, or when one designated (deadline) child has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParallelEnd {
    #[default]
    All,
    Any,
    Child(Uuid),
}

impl fmt::Display for ParallelEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParallelEnd::All => f.write_str("all"),
            ParallelEnd::Any => f.write_str("any"),
            ParallelEnd::Child(id) => write!(f, "{id}"),
        }
    }
}

impl std::str::FromStr for ParallelEnd {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ParallelEnd::All),
            "any" => Ok(ParallelEnd::Any),
            other => Uuid::parse_str(other)
                .map(ParallelEnd::Child)
                .map_err(|_| crate::error::CoreError::InvalidParallelEnd(other.to_string())),
        }
    }
}

impl Serialize for ParallelEnd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParallelEnd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
