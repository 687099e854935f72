//! Typed coded values
//!
//! Each code system is a closed Rust enum whose symbols and numbers are the
//! single source for the matching registry enumeration.

use std::fmt;

/// A closed, integer-backed set of symbolic codes
pub trait CodeSystem: Copy + Sized + 'static {
    /// Enumeration name in the schema registry
    const NAME: &'static str;
    /// `(symbol, number)` pairs in declaration order
    const MEMBERS: &'static [(&'static str, i32)];

    fn number(self) -> i32;
    fn symbol(self) -> &'static str;
    fn from_number(number: i32) -> Option<Self>;

    fn from_symbol(symbol: &str) -> Option<Self> {
        Self::MEMBERS
            .iter()
            .find(|(s, _)| *s == symbol)
            .and_then(|(_, number)| Self::from_number(*number))
    }
}

/// A coded value as handed to `Record::set_code`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRef<'a> {
    /// Member of a typed code system; checked against the field's enumeration
    Member { enumeration: &'static str, number: i32 },
    Symbol(&'a str),
    Number(i32),
}

impl From<i32> for CodeRef<'_> {
    fn from(number: i32) -> Self {
        CodeRef::Number(number)
    }
}

impl<'a> From<&'a str> for CodeRef<'a> {
    fn from(symbol: &'a str) -> Self {
        CodeRef::Symbol(symbol)
    }
}

macro_rules! code_system {
    (
        $(#[$meta:meta])*
        $name:ident => $enum_name:literal {
            $($variant:ident = $symbol:literal => $number:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl CodeSystem for $name {
            const NAME: &'static str = $enum_name;
            const MEMBERS: &'static [(&'static str, i32)] = &[$(($symbol, $number)),+];

            fn number(self) -> i32 {
                match self {
                    $(Self::$variant => $number),+
                }
            }

            fn symbol(self) -> &'static str {
                match self {
                    $(Self::$variant => $symbol),+
                }
            }

            fn from_number(number: i32) -> Option<Self> {
                match number {
                    $($number => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl From<$name> for CodeRef<'static> {
            fn from(code: $name) -> Self {
                CodeRef::Member {
                    enumeration: <$name as CodeSystem>::NAME,
                    number: code.number(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.symbol())
            }
        }
    };
}

code_system! {
    /// Administrative gender of a patient
    AdministrativeGender => "AdministrativeGenderCode" {
        Male = "MALE" => 1,
        Female = "FEMALE" => 2,
        Other = "OTHER" => 3,
        Unknown = "UNKNOWN" => 4,
    }
}

code_system! {
    /// Telecommunications form of a contact point
    ContactPointSystem => "ContactPointSystemCode" {
        Phone = "PHONE" => 1,
        Fax = "FAX" => 2,
        Email = "EMAIL" => 3,
        Pager = "PAGER" => 4,
        Url = "URL" => 5,
        Sms = "SMS" => 6,
        Other = "OTHER" => 7,
    }
}

code_system! {
    /// Purpose of a contact point
    ContactPointUse => "ContactPointUseCode" {
        Home = "HOME" => 1,
        Work = "WORK" => 2,
        Temp = "TEMP" => 3,
        Old = "OLD" => 4,
        Mobile = "MOBILE" => 5,
    }
}

code_system! {
    /// Purpose of a human name
    NameUse => "NameUseCode" {
        Usual = "USUAL" => 1,
        Official = "OFFICIAL" => 2,
        Temp = "TEMP" => 3,
        Nickname = "NICKNAME" => 4,
        Anonymous = "ANONYMOUS" => 5,
        Old = "OLD" => 6,
        Maiden = "MAIDEN" => 7,
    }
}
