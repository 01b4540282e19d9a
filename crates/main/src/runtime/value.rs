////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::fmt::{Display, Formatter};

use compact_str::CompactString;

use crate::runtime::{Origin, RuntimeError, RuntimeResult};

/// A dynamically typed value stored in an
/// [Instance's properties](crate::runtime::ValueStore), passed as an
/// operation argument, or returned from an operation.
///
/// The [Display] implementation renders the value the way it would be
/// interpolated into a string: numbers without a fractional part are printed
/// as integers (`30` rather than `30.0`), and [Nil](Value::Nil) is printed as
/// `nil`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// The absence of a value. Returned by operations that produce nothing,
    /// such as the property setters.
    #[default]
    Nil,

    /// A boolean value.
    Bool(bool),

    /// A numeric value.
    Number(f64),

    /// A string value.
    String(CompactString),
}

impl Display for Value {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => formatter.write_str("nil"),

            Self::Bool(value) => Display::fmt(value, formatter),

            Self::Number(value) if value.is_finite() && value.fract() == 0.0 => {
                match value.abs() < 1e15 {
                    true => formatter.write_fmt(format_args!("{}", *value as i64)),
                    false => Display::fmt(value, formatter),
                }
            }

            Self::Number(value) => Display::fmt(value, formatter),

            Self::String(value) => formatter.write_str(value),
        }
    }
}

impl From<()> for Value {
    #[inline(always)]
    fn from(_: ()) -> Self {
        Self::Nil
    }
}

impl From<bool> for Value {
    #[inline(always)]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    #[inline(always)]
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for Value {
    #[inline(always)]
    fn from(value: f32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for Value {
    #[inline(always)]
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i64> for Value {
    #[inline(always)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u32> for Value {
    #[inline(always)]
    fn from(value: u32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<usize> for Value {
    #[inline(always)]
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl<'a> From<&'a str> for Value {
    #[inline(always)]
    fn from(value: &'a str) -> Self {
        Self::String(CompactString::from(value))
    }
}

impl From<String> for Value {
    #[inline(always)]
    fn from(value: String) -> Self {
        Self::String(CompactString::from(value))
    }
}

impl From<CompactString> for Value {
    #[inline(always)]
    fn from(value: CompactString) -> Self {
        Self::String(value)
    }
}

impl PartialEq<str> for Value {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        match self {
            Self::String(value) => value.as_str() == other,
            _ => false,
        }
    }
}

impl<'a> PartialEq<&'a str> for Value {
    #[inline(always)]
    fn eq(&self, other: &&'a str) -> bool {
        self.eq(*other)
    }
}

impl PartialEq<f64> for Value {
    #[inline]
    fn eq(&self, other: &f64) -> bool {
        match self {
            Self::Number(value) => value == other,
            _ => false,
        }
    }
}

impl PartialEq<bool> for Value {
    #[inline]
    fn eq(&self, other: &bool) -> bool {
        match self {
            Self::Bool(value) => value == other,
            _ => false,
        }
    }
}

impl Value {
    /// Returns a user-facing name of the value's type: `nil`, `bool`,
    /// `number` or `string`.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(..) => "bool",
            Self::Number(..) => "number",
            Self::String(..) => "string",
        }
    }

    /// Returns true if the value is [Nil](Value::Nil).
    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Interprets the value as a boolean.
    ///
    /// Returns a [TypeMismatch](RuntimeError::TypeMismatch) error pointing at
    /// the caller if the value holds a different type.
    #[track_caller]
    pub fn as_bool(&self) -> RuntimeResult<bool> {
        match self {
            Self::Bool(value) => Ok(*value),
            _ => Err(self.mismatch(Origin::caller(), "bool")),
        }
    }

    /// Interprets the value as a number.
    ///
    /// Returns a [TypeMismatch](RuntimeError::TypeMismatch) error pointing at
    /// the caller if the value holds a different type.
    #[track_caller]
    pub fn as_number(&self) -> RuntimeResult<f64> {
        match self {
            Self::Number(value) => Ok(*value),
            _ => Err(self.mismatch(Origin::caller(), "number")),
        }
    }

    /// Interprets the value as a string.
    ///
    /// Returns a [TypeMismatch](RuntimeError::TypeMismatch) error pointing at
    /// the caller if the value holds a different type.
    #[track_caller]
    pub fn as_str(&self) -> RuntimeResult<&str> {
        match self {
            Self::String(value) => Ok(value.as_str()),
            _ => Err(self.mismatch(Origin::caller(), "string")),
        }
    }

    #[inline(always)]
    fn mismatch(&self, access_origin: Origin, expected: &'static str) -> RuntimeError {
        RuntimeError::TypeMismatch {
            access_origin,
            expected,
            actual: self.type_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RuntimeError, Value};

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from(30).to_string(), "30");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(-100.0).to_string(), "-100");
        assert_eq!(Value::from("white").to_string(), "white");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::Nil.to_string(), "nil");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from("dark").as_str().unwrap(), "dark");
        assert_eq!(Value::from(7).as_number().unwrap(), 7.0);
        assert!(Value::from(false).as_bool().is_ok());
        assert!(Value::Nil.is_nil());
        assert!(Value::default().is_nil());
        assert!(!Value::from(0).is_nil());

        let error = Value::from("dark").as_number().unwrap_err();

        assert!(matches!(
            error,
            RuntimeError::TypeMismatch {
                expected: "number",
                actual: "string",
                ..
            }
        ));
        assert!(error.primary_origin().to_string().contains("value.rs"));
    }

    #[test]
    fn test_value_comparison() {
        assert_eq!(Value::from("white"), "white");
        assert_eq!(Value::from(30), 30.0);
        assert_eq!(Value::from(true), true);
        assert_ne!(Value::from("30"), 30.0);
    }
}
