//! Macro for implementing Display and FromStr for small domain enums
//!
//! Keeps string conversions for enums like [`crate::DayKind`] in one place.
//! Parsing is case-insensitive; output is always the canonical lowercase form.
//!
//! # Example
//!
//! ```rust
//! use crewcal_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum PushState {
//!     Pending,
//!     Pushed,
//! }
//!
//! impl_domain_status_conversions!(PushState {
//!     Pending => "pending",
//!     Pushed => "pushed",
//! });
//!
//! assert_eq!(PushState::Pushed.to_string(), "pushed");
//! assert_eq!("PENDING".parse::<PushState>().unwrap(), PushState::Pending);
//! ```

/// Implements Display and FromStr traits for domain enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Leg {
        Outbound,
        Inbound,
    }

    impl_domain_status_conversions!(Leg {
        Outbound => "outbound",
        Inbound => "inbound",
    });

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Leg::Outbound.to_string(), "outbound");
        assert_eq!(Leg::Inbound.to_string(), "inbound");
    }

    #[test]
    fn parse_ignores_case_and_padding() {
        assert_eq!(Leg::from_str("OUTBOUND").unwrap(), Leg::Outbound);
        assert_eq!(Leg::from_str(" Inbound ").unwrap(), Leg::Inbound);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = Leg::from_str("sideways").unwrap_err();
        assert!(err.contains("Invalid Leg: sideways"));
    }
}
