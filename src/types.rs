use crate::error::QueryError;
use std::fmt;
use std::str::FromStr;

/// Data type of a content property, as reported by the schema lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Long,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Binary,
    /// Identifier of another content node, rendered like a string.
    Reference,
    /// Reserved tag: render as an integer regardless of the declared property type.
    ForceInteger,
}

impl TypeTag {
    pub const ALL: [TypeTag; 10] = [
        TypeTag::String,
        TypeTag::Long,
        TypeTag::Double,
        TypeTag::Decimal,
        TypeTag::Boolean,
        TypeTag::Date,
        TypeTag::DateTime,
        TypeTag::Binary,
        TypeTag::Reference,
        TypeTag::ForceInteger,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Long => "long",
            TypeTag::Double => "double",
            TypeTag::Decimal => "decimal",
            TypeTag::Boolean => "boolean",
            TypeTag::Date => "date",
            TypeTag::DateTime => "datetime",
            TypeTag::Binary => "binary",
            TypeTag::Reference => "reference",
            TypeTag::ForceInteger => "force_integer",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "integer" | "int" => Ok(TypeTag::Long),
            "timestamp" => Ok(TypeTag::DateTime),
            _ => TypeTag::ALL
                .into_iter()
                .find(|t| t.name() == lower)
                .ok_or_else(|| QueryError::InvalidArgument(format!("Unknown type tag: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        for tag in TypeTag::ALL {
            assert_eq!(tag.name().parse::<TypeTag>().unwrap(), tag);
        }
        assert_eq!("Integer".parse::<TypeTag>().unwrap(), TypeTag::Long);
        assert_eq!("TIMESTAMP".parse::<TypeTag>().unwrap(), TypeTag::DateTime);
        assert!("uuid".parse::<TypeTag>().is_err());
    }
}
