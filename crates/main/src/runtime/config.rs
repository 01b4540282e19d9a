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

/// A configuration of the dispatch engine attached to a
/// [Descriptor](crate::runtime::Descriptor) or a
/// [ModalDescriptor](crate::runtime::ModalDescriptor) at build time.
///
/// The configuration of the descriptor an [Instance](crate::runtime::Instance)
/// is bound to decides how the Instance's requests are classified into
/// property accessors and named operations.
///
/// ```
/// use cookie_cutter::runtime::DispatchConfig;
///
/// let mut config = DispatchConfig::new();
///
/// config.stack_limit = 16;
///
/// assert!(config.is_reserved("getColor"));
/// assert!(!config.is_reserved("bake"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub struct DispatchConfig {
    /// The prefix of the property reading accessors: `getColor` reads the
    /// `color` property.
    ///
    /// An empty prefix disables property reading accessors.
    ///
    /// The default value is "get".
    pub get_prefix: &'static str,

    /// The prefix of the property writing accessors: `setColor` writes the
    /// `color` property.
    ///
    /// An empty prefix disables property writing accessors.
    ///
    /// The default value is "set".
    pub set_prefix: &'static str,

    /// If set to true, the property name derived from an accessor name is
    /// lowercased: `getWeight` addresses the `weight` property.
    ///
    /// The default value is true.
    pub fold_case: bool,

    /// The maximum number of nested operation calls on a single Instance.
    ///
    /// Operations may invoke other operations on their receiver; a call that
    /// exceeds this depth fails with the
    /// [StackOverflow](crate::runtime::RuntimeError::StackOverflow) error.
    ///
    /// The default value is 512.
    pub stack_limit: usize,
}

impl Default for DispatchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchConfig {
    /// The default constructor for this configuration object.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            get_prefix: "get",
            set_prefix: "set",
            fold_case: true,
            stack_limit: 512,
        }
    }

    /// Returns true if the `name` is classified as a property accessor under
    /// this configuration. Operations registered under such names are
    /// unreachable.
    #[inline]
    pub fn is_reserved(&self, name: &str) -> bool {
        Self::has_prefix(name, self.set_prefix) || Self::has_prefix(name, self.get_prefix)
    }

    #[inline(always)]
    pub(crate) fn strip_set<'a>(&self, name: &'a str) -> Option<&'a str> {
        Self::strip(name, self.set_prefix)
    }

    #[inline(always)]
    pub(crate) fn strip_get<'a>(&self, name: &'a str) -> Option<&'a str> {
        Self::strip(name, self.get_prefix)
    }

    #[inline(always)]
    fn has_prefix(name: &str, prefix: &str) -> bool {
        !prefix.is_empty() && name.starts_with(prefix)
    }

    #[inline(always)]
    fn strip<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
        match prefix.is_empty() {
            true => None,
            false => name.strip_prefix(prefix),
        }
    }
}
