//! Attribute definitions for entities and relationships

use serde::{Deserialize, Serialize};

/// The kind of value an attribute holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    /// Opaque identifier
    Id,
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Boolean,
    /// Named enum value, stored as a string
    Enum,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Timezone-aware timestamp
    DateTime,
    /// Calendar/clock duration
    Duration,
    /// Geographic or cartesian point
    Point,
}

impl AttributeType {
    /// Returns true for date, time and datetime attributes
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            AttributeType::Date | AttributeType::Time | AttributeType::DateTime
        )
    }

    /// Returns true for point attributes
    pub fn is_spatial(&self) -> bool {
        matches!(self, AttributeType::Point)
    }

    /// Returns true for attributes that support avg/sum aggregation
    pub fn is_numeric(&self) -> bool {
        matches!(self, AttributeType::Int | AttributeType::Float)
    }

    /// Returns true for attributes that support string operators
    /// (CONTAINS, STARTS_WITH, ENDS_WITH)
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            AttributeType::String | AttributeType::Id | AttributeType::Enum
        )
    }

    /// The Cypher constructor function wrapping comparison parameters of
    /// this type, if any (`date()`, `time()`, `datetime()`).
    pub fn coercion_function(&self) -> Option<&'static str> {
        match self {
            AttributeType::Date => Some("date"),
            AttributeType::Time => Some("time"),
            AttributeType::DateTime => Some("datetime"),
            _ => None,
        }
    }
}

/// A uniquely-named attribute of an entity or relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Field name as exposed to clients
    pub name: String,

    /// Kind of value stored
    pub attribute_type: AttributeType,

    /// Whether the attribute is non-nullable
    pub required: bool,

    /// Whether the attribute holds a list of values
    pub list: bool,

    /// Built-in (generated) vs user-declared
    pub builtin: bool,
}

impl Attribute {
    /// Create a user-declared, optional, scalar attribute
    pub fn new<S: Into<String>>(name: S, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            required: false,
            list: false,
            builtin: false,
        }
    }

    /// Mark the attribute as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the attribute as list-valued
    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    /// Mark the attribute as built-in
    pub fn builtin(mut self) -> Self {
        self.builtin = true;
        self
    }
}
