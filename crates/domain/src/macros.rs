//! Macro for implementing Display and FromStr for label enums
//!
//! Configuration values and error kinds are written to config files and log
//! fields as lowercase labels. This macro provides both conversions from a
//! single variant-to-label table.
//!
//! # Example
//!
//! ```rust
//! use profilelink_domain::impl_domain_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Backend {
//!     Memory,
//!     Redis,
//! }
//!
//! impl_domain_label_conversions!(Backend {
//!     Memory => "memory",
//!     Redis => "redis",
//! });
//!
//! assert_eq!(Backend::Redis.to_string(), "redis");
//! assert_eq!("MEMORY".parse::<Backend>(), Ok(Backend::Memory));
//! ```

/// Implements Display and FromStr traits for label enums
///
/// - Display writes the label verbatim
/// - FromStr parses case-insensitively and trims surrounding whitespace
#[macro_export]
macro_rules! impl_domain_label_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => ::core::result::Result::Ok(Self::$variant),)+
                    _ => ::core::result::Result::Err(::std::format!(
                        "Invalid {}: {}",
                        stringify!($enum_name),
                        s
                    )),
                }
            }
        }
    };
}
