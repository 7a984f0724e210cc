//! Raw type name → swagger primitive kind.
use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;

pub const STRING: &str = "Ljava/lang/String;";
pub const BOOLEAN: &str = "Ljava/lang/Boolean;";
pub const PRIMITIVE_BOOLEAN: &str = "Z";

static INTEGER_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "I",
        "J",
        "S",
        "B",
        "Ljava/lang/Integer;",
        "Ljava/lang/Long;",
        "Ljava/lang/Short;",
        "Ljava/lang/Byte;",
        "Ljava/math/BigInteger;",
    ])
});

static DOUBLE_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "F",
        "D",
        "Ljava/lang/Float;",
        "Ljava/lang/Double;",
        "Ljava/math/BigDecimal;",
    ])
});

/// Swagger `type` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl SchemaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Array => "array",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Integer => "integer",
            SchemaKind::Null => "null",
            SchemaKind::Number => "number",
            SchemaKind::Object => "object",
            SchemaKind::String => "string",
        }
    }

    /// Kinds rendered inline without consulting the type graph.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            SchemaKind::Boolean | SchemaKind::Integer | SchemaKind::Null | SchemaKind::Number | SchemaKind::String
        )
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown names are `Object`: the type graph decides their shape.
pub fn classify(raw_name: &str) -> SchemaKind {
    if INTEGER_TYPES.contains(raw_name) {
        SchemaKind::Integer
    } else if DOUBLE_TYPES.contains(raw_name) {
        SchemaKind::Number
    } else if raw_name == BOOLEAN || raw_name == PRIMITIVE_BOOLEAN {
        SchemaKind::Boolean
    } else if raw_name == STRING {
        SchemaKind::String
    } else {
        SchemaKind::Object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers_and_primitives_share_a_kind() {
        assert_eq!(classify("I"), SchemaKind::Integer);
        assert_eq!(classify("Ljava/lang/Long;"), SchemaKind::Integer);
        assert_eq!(classify("Ljava/math/BigInteger;"), SchemaKind::Integer);
        assert_eq!(classify("D"), SchemaKind::Number);
        assert_eq!(classify("Ljava/math/BigDecimal;"), SchemaKind::Number);
        assert_eq!(classify("Z"), SchemaKind::Boolean);
        assert_eq!(classify("Ljava/lang/Boolean;"), SchemaKind::Boolean);
        assert_eq!(classify(STRING), SchemaKind::String);
    }

    #[test]
    fn unknown_names_are_structural() {
        assert_eq!(classify("Lcom/acme/User;"), SchemaKind::Object);
        assert_eq!(classify(""), SchemaKind::Object);
        assert_eq!(classify("$1"), SchemaKind::Object);
        // char is not in any of the sets
        assert_eq!(classify("C"), SchemaKind::Object);
        assert_eq!(classify("V"), SchemaKind::Object);
        assert_eq!(classify("Ljava/lang/Void;"), SchemaKind::Object);
        assert!(!classify("Lcom/acme/User;").is_primitive());
    }

    #[test]
    fn kinds_render_lowercase() {
        assert_eq!(SchemaKind::Integer.to_string(), "integer");
        assert_eq!(SchemaKind::Array.as_str(), "array");
        assert!(SchemaKind::Null.is_primitive());
        assert!(!SchemaKind::Array.is_primitive());
    }
}
