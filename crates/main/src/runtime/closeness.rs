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
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
};

use strsim::normalized_damerau_levenshtein;

use crate::runtime::Ident;

const EPSILON: f32 = 0.0001;

/// A score representing the similarity of two names in terms of percentage.
///
/// "100%" indicates that the names are identical, while "0%" indicates they
/// are completely distinct.
///
/// The runtime uses this score to suggest a known operation, property or mode
/// name when a lookup fails.
#[repr(transparent)]
#[derive(Clone, Copy, Default)]
pub struct Closeness(f32);

impl Debug for Closeness {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, formatter)
    }
}

impl Display for Closeness {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("{}%", self.percents()))
    }
}

impl PartialEq for Closeness {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.normalized().eq(&other.normalized())
    }
}

impl Eq for Closeness {}

impl PartialOrd for Closeness {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Closeness {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized().cmp(&other.normalized())
    }
}

impl Closeness {
    /// Returns a "50%" closeness value. Names below this threshold are never
    /// suggested.
    #[inline(always)]
    pub const fn half() -> Self {
        Self(0.5)
    }

    /// Returns a "100%" closeness value.
    #[inline(always)]
    pub const fn one() -> Self {
        Self(1.0)
    }

    /// Estimates the similarity between the `name` and the `pattern`.
    pub fn estimate(name: &str, pattern: &str) -> Self {
        let closeness = normalized_damerau_levenshtein(pattern, name);

        Self((closeness as f32 / EPSILON) as usize as f32 * EPSILON)
    }

    /// Returns the underlying percentage value rounded to the nearest
    /// integer.
    #[inline(always)]
    pub fn percents(self) -> u16 {
        ((self.0 * 1000.0).round() / 10.0) as u16
    }

    #[inline(always)]
    fn normalized(self) -> u32 {
        (self.0 / EPSILON) as u32
    }
}

// Picks the candidate most similar to the pattern, if it is at least half
// similar. Ties resolve to the lexicographically smallest name.
pub(crate) fn closest<'a>(
    pattern: &str,
    candidates: impl IntoIterator<Item = &'a Ident>,
) -> Option<Ident> {
    let mut best: Option<(Closeness, &'a Ident)> = None;

    for candidate in candidates {
        let closeness = Closeness::estimate(candidate.as_str(), pattern);

        if closeness < Closeness::half() {
            continue;
        }

        best = match best {
            Some((score, name))
                if score > closeness || (score == closeness && name <= candidate) =>
            {
                Some((score, name))
            }

            _ => Some((closeness, candidate)),
        };
    }

    best.map(|(_, name)| name.clone())
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        closeness::{closest, Closeness},
        Ident,
    };

    #[test]
    fn test_closeness_estimation() {
        assert_eq!(Closeness::estimate("bake", "bake"), Closeness::one());
        assert!(Closeness::estimate("bake", "xyzw") < Closeness::half());
        assert_eq!(Closeness::estimate("bake", "bake").to_string(), "100%");
    }

    #[test]
    fn test_closest_candidate() {
        let candidates = [
            Ident::from("bake"),
            Ident::from("contemplate"),
            Ident::from("eat"),
        ];

        assert_eq!(
            closest("contempalte", &candidates),
            Some(Ident::from("contemplate")),
        );
        assert_eq!(closest("bkae", &candidates), Some(Ident::from("bake")));
        assert_eq!(closest("refrigerate", &candidates), None);
    }
}
