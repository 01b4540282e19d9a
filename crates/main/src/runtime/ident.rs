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
    borrow::Borrow,
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
};

use compact_str::CompactString;

/// A name of an operation, a property, a mode or a descriptor.
///
/// You can retrieve the actual string of the identifier using the [Display],
/// [Debug], and [AsRef<str>](AsRef) implementations of this type.
///
/// Identifiers are compared, ordered and hashed by their string content, and
/// the type implements [`Borrow<str>`](Borrow), so tables keyed by Ident can
/// be queried with plain string slices.
#[derive(Clone, Default)]
pub struct Ident {
    string: CompactString,
}

impl Debug for Ident {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.string.as_str(), formatter)
    }
}

impl Display for Ident {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.string.as_str(), formatter)
    }
}

impl AsRef<str> for Ident {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        self.string.as_str()
    }
}

impl Borrow<str> for Ident {
    #[inline(always)]
    fn borrow(&self) -> &str {
        self.string.as_str()
    }
}

impl PartialEq for Ident {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.string.eq(&other.string)
    }
}

impl Eq for Ident {}

impl PartialEq<str> for Ident {
    #[inline(always)]
    fn eq(&self, other: &str) -> bool {
        self.string.as_str().eq(other)
    }
}

impl<'a> PartialEq<&'a str> for Ident {
    #[inline(always)]
    fn eq(&self, other: &&'a str) -> bool {
        self.string.as_str().eq(*other)
    }
}

// Must agree with the Hash of str because of the Borrow<str> implementation.
impl Hash for Ident {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.string.as_str().hash(state)
    }
}

impl PartialOrd for Ident {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ident {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        self.string.as_str().cmp(other.string.as_str())
    }
}

impl<'a> From<&'a str> for Ident {
    #[inline(always)]
    fn from(value: &'a str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Ident {
    #[inline(always)]
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<CompactString> for Ident {
    #[inline(always)]
    fn from(value: CompactString) -> Self {
        Self { string: value }
    }
}

impl<'a> From<&'a Ident> for Ident {
    #[inline(always)]
    fn from(value: &'a Ident) -> Self {
        value.clone()
    }
}

impl Ident {
    /// Creates a new identifier from a string.
    #[inline(always)]
    pub fn new(string: impl Into<CompactString>) -> Self {
        Self {
            string: string.into(),
        }
    }

    /// Returns the string of this identifier.
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        self.string.as_str()
    }

    /// Returns true if the identifier is an empty string.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.string.is_empty()
    }

    #[inline(always)]
    pub(crate) fn lowercase(string: &str) -> Self {
        Self {
            string: string.to_lowercase().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::runtime::Ident;

    #[test]
    fn test_ident_lookup_by_str() {
        let mut table = HashMap::new();

        table.insert(Ident::from("bake"), 1);
        table.insert(Ident::from(String::from("contemplate")), 2);

        assert_eq!(table.get("bake"), Some(&1));
        assert_eq!(table.get("contemplate"), Some(&2));
        assert_eq!(table.get("Bake"), None);
    }

    #[test]
    fn test_ident_formatting() {
        let ident = Ident::new("weight");

        assert_eq!(format!("{ident}"), "weight");
        assert_eq!(format!("{ident:?}"), "\"weight\"");
        assert_eq!(Ident::lowercase("WeIgHt"), "weight");
        assert!(Ident::default().is_empty());
    }
}
