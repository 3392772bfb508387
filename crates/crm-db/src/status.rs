use std::{fmt, str::FromStr};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown status '{0}' can not be converted")]
    UnknownName(String),
    #[error("Unknown stored status value {0} can not be converted")]
    UnknownValue(i16),
}

/// Lifecycle status of a customer - stored as a small integer, exposed as a string
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomerStatus {
    Prospective,
    Current,
    NonActive,
}

macro_rules! impl_status_mapping {
    {
        Enum $enum_type:ident; $($variant:ident => $value:literal, $name:literal),+
    } => {
        impl $enum_type {
            pub const ALL: &'static [$enum_type] = &[$($enum_type::$variant),+];

            pub fn as_str(&self) -> &'static str {
                use $enum_type::*;
                match self {
                    $($variant => $name),+
                }
            }
        }

        impl From<$enum_type> for i16 {
            fn from(status: $enum_type) -> Self {
                use $enum_type::*;
                match status {
                    $($variant => $value),+
                }
            }
        }

        impl TryFrom<i16> for $enum_type {
            type Error = Error;

            fn try_from(value: i16) -> Result<Self, Self::Error> {
                use $enum_type::*;
                match value {
                    $($value => Ok($variant)),+,
                    v => Err(Error::UnknownValue(v)),
                }
            }
        }

        impl FromStr for $enum_type {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                use $enum_type::*;
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok($variant)),+,
                    _ => Err(Error::UnknownName(s.to_owned())),
                }
            }
        }
    };
}

impl_status_mapping! {
    Enum CustomerStatus;
    Prospective => 1, "prospective",
    Current => 2, "current",
    NonActive => 3, "non-active"
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_converts_known_names_to_their_stored_values() {
        assert_eq!(i16::from("prospective".parse::<CustomerStatus>().unwrap()), 1);
        assert_eq!(i16::from("current".parse::<CustomerStatus>().unwrap()), 2);
        assert_eq!(i16::from("non-active".parse::<CustomerStatus>().unwrap()), 3);
    }

    #[test]
    fn it_converts_known_stored_values_to_their_names() {
        assert_eq!(CustomerStatus::try_from(1).unwrap().to_string(), "prospective");
        assert_eq!(CustomerStatus::try_from(2).unwrap().to_string(), "current");
        assert_eq!(CustomerStatus::try_from(3).unwrap().to_string(), "non-active");
    }

    #[test]
    fn it_is_a_bijection_over_the_known_statuses() {
        for status in CustomerStatus::ALL {
            let value = i16::from(*status);
            assert_eq!(CustomerStatus::try_from(value), Ok(*status));
            assert_eq!(status.as_str().parse::<CustomerStatus>(), Ok(*status));
        }
    }

    #[test]
    fn it_accepts_padded_and_mixed_case_names() {
        assert_eq!(
            "  Non-Active \n".parse::<CustomerStatus>(),
            Ok(CustomerStatus::NonActive)
        );
        assert_eq!("CURRENT".parse::<CustomerStatus>(), Ok(CustomerStatus::Current));
    }

    #[test]
    fn it_rejects_unknown_names_and_values() {
        assert_eq!(
            "inactive".parse::<CustomerStatus>(),
            Err(Error::UnknownName("inactive".to_owned()))
        );
        assert!("".parse::<CustomerStatus>().is_err());
        for value in [0, 4, -1, i16::MAX] {
            assert_eq!(CustomerStatus::try_from(value), Err(Error::UnknownValue(value)));
        }
    }

    #[test]
    fn it_serializes_as_the_external_name() {
        assert_eq!(
            serde_json::to_string(&CustomerStatus::NonActive).unwrap(),
            "\"non-active\""
        );
    }
}
