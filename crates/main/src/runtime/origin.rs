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

use std::{
    fmt::{Debug, Display, Formatter},
    panic::Location,
};

/// A pointer to the Rust source code location where a dispatch request was
/// issued.
///
/// The runtime captures Origins through `#[track_caller]` functions such as
/// [Instance::invoke](crate::runtime::Instance::invoke) and stores them in
/// [runtime errors](crate::runtime::RuntimeError), so an error can be traced
/// back to the call that triggered it.
///
/// For debugging purposes, you can instantiate the Origin object as
/// [Origin::nil], which intentionally does not point to any source code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// An Origin that does not point to any source code.
    Nil,

    /// A location in the Rust source code.
    Rust(&'static Location<'static>),
}

impl Default for Origin {
    #[inline(always)]
    fn default() -> Self {
        Self::nil()
    }
}

impl Debug for Origin {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => formatter.write_str("Origin(nil)"),
            Self::Rust(location) => formatter.write_fmt(format_args!("Origin({location})")),
        }
    }
}

impl Display for Origin {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => formatter.write_str("[?]"),
            Self::Rust(location) => Display::fmt(location, formatter),
        }
    }
}

impl From<&'static Location<'static>> for Origin {
    #[inline(always)]
    fn from(value: &'static Location<'static>) -> Self {
        Self::Rust(value)
    }
}

impl Origin {
    /// Creates an instance of Origin that intentionally does not point
    /// to any source code. This serves as the Default constructor for this
    /// object.
    #[inline(always)]
    pub const fn nil() -> Self {
        Self::Nil
    }

    /// Returns an Origin pointing to the caller of the current
    /// `#[track_caller]` function.
    #[inline(always)]
    #[track_caller]
    pub fn caller() -> Self {
        Self::Rust(Location::caller())
    }

    /// Returns true if this instance is the [Nil Origin](Origin::nil).
    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// This function is guaranteed to panic with the provided `message`,
    /// prefixed with the source code location this Origin points to.
    #[inline(never)]
    pub fn blame<T>(&self, message: &str) -> T {
        match self {
            Self::Nil => panic!("{message}"),
            Self::Rust(location) => panic!("{location}: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::Origin;

    #[test]
    fn test_caller_origin() {
        let origin = Origin::caller();

        assert!(!origin.is_nil());
        assert!(origin.to_string().contains("origin.rs"));

        assert!(Origin::default().is_nil());
        assert_eq!(Origin::nil().to_string(), "[?]");
    }

    #[test]
    #[should_panic(expected = "broken cutter")]
    fn test_blame() {
        Origin::caller().blame::<()>("broken cutter");
    }
}
