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

use std::fmt::{Debug, Formatter};

use ahash::AHashMap;

use crate::runtime::{Ident, Value};

/// A per-instance mapping of declared property names to their [values](Value).
///
/// The set of keys is fixed when the store is created (through
/// [FromIterator], the array [From] implementation, or
/// [declare](Self::declare) calls before the store is handed over to an
/// [Instance](crate::runtime::Instance)). Reading and writing through
/// [get](Self::get) and [set](Self::set) never creates new keys: accessing an
/// undeclared key fails instead.
///
/// ```
/// use cookie_cutter::runtime::{Value, ValueStore};
///
/// let mut store = ValueStore::from([("color", "white")]);
///
/// assert_eq!(store.get("color"), Some(&Value::from("white")));
/// assert!(store.set("color", Value::from("dark")).is_some());
///
/// // Undeclared keys are rejected and the store stays untouched.
/// assert!(store.set("weight", Value::from(10)).is_none());
/// assert!(!store.contains("weight"));
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct ValueStore {
    values: AHashMap<Ident, Value>,
}

impl Debug for ValueStore {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let mut entries = self.values.iter().collect::<Vec<_>>();

        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        formatter.debug_map().entries(entries).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for ValueStore
where
    K: Into<Ident>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();

        for (key, value) in iter {
            store.declare(key, value);
        }

        store
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ValueStore
where
    K: Into<Ident>,
    V: Into<Value>,
{
    #[inline(always)]
    fn from(value: [(K, V); N]) -> Self {
        Self::from_iter(value)
    }
}

impl ValueStore {
    /// Creates an empty store without declared properties.
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a property `key` with the initial `value`.
    ///
    /// If the key has already been declared, its value is replaced.
    #[inline]
    pub fn declare(&mut self, key: impl Into<Ident>, value: impl Into<Value>) -> &mut Self {
        let _ = self.values.insert(key.into(), value.into());

        self
    }

    /// Returns true if the property `key` is declared in this store.
    #[inline(always)]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the current value of the property `key`, or None if the key is
    /// not declared.
    #[inline(always)]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Replaces the value of the declared property `key` and returns the
    /// previous value.
    ///
    /// Returns None and leaves the store unchanged if the key is not
    /// declared.
    #[inline]
    pub fn set(&mut self, key: &str, value: Value) -> Option<Value> {
        let slot = self.values.get_mut(key)?;

        Some(std::mem::replace(slot, value))
    }

    /// Returns an iterator over the declared property names in unspecified
    /// order.
    #[inline(always)]
    pub fn keys(&self) -> impl Iterator<Item = &Ident> + '_ {
        self.values.keys()
    }

    /// Returns an iterator over the declared properties and their values in
    /// unspecified order.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = (&Ident, &Value)> + '_ {
        self.values.iter()
    }

    /// Returns the number of declared properties.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the store has no declared properties.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{Value, ValueStore};

    #[test]
    fn test_store_rejects_undeclared_keys() {
        let mut store = ValueStore::from([
            ("color", Value::from("white")),
            ("weight", Value::from(10)),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.set("weight", Value::from(12)), Some(Value::from(10)));
        assert_eq!(store.get("weight"), Some(&Value::from(12)));

        assert_eq!(store.set("size", Value::from(1)), None);
        assert_eq!(store.get("size"), None);
        assert_eq!(store.len(), 2);

        let mut entries = store
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>();

        entries.sort();

        assert_eq!(entries, ["color=white", "weight=12"]);
    }

    #[test]
    fn test_store_debug_is_sorted() {
        let store = [("weight", 10), ("color", 1)]
            .into_iter()
            .collect::<ValueStore>();

        assert_eq!(
            format!("{store:?}"),
            r#"{"color": Number(1.0), "weight": Number(10.0)}"#,
        );
    }
}
