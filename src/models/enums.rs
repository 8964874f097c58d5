use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not name any variant of a `str_enum!` enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: '{value}'")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(LabStatus {
    Low => "low",
    Normal => "normal",
    High => "high",
});

str_enum!(ValueSource {
    Extracted => "extracted",
    Manual => "manual",
});

impl Default for LabStatus {
    fn default() -> Self {
        Self::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn lab_status_round_trip() {
        for (variant, s) in [
            (LabStatus::Low, "low"),
            (LabStatus::Normal, "normal"),
            (LabStatus::High, "high"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(LabStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn value_source_round_trip() {
        for (variant, s) in [
            (ValueSource::Extracted, "extracted"),
            (ValueSource::Manual, "manual"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ValueSource::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn lab_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LabStatus::High).unwrap(), "\"high\"");
        let parsed: LabStatus = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, LabStatus::Low);
    }

    #[test]
    fn lab_status_defaults_to_normal() {
        assert_eq!(LabStatus::default(), LabStatus::Normal);
    }

    #[test]
    fn invalid_enum_returns_error() {
        let err = LabStatus::from_str("critical").unwrap_err();
        assert_eq!(err.field, "LabStatus");
        assert_eq!(err.value, "critical");
        assert!(ValueSource::from_str("EXTRACTED").is_err());
    }
}
