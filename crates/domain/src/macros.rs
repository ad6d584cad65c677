//! Declarative helpers shared by the domain enums.

/// Implements `as_str`, `Display` and case-insensitive `FromStr` for a
/// fieldless enum, using the text each variant has on the wire.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Canonical text form, as exchanged with the registry.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::device::ParseValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::device::ParseValueError {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

pub(crate) use string_enum;
