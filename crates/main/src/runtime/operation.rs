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
    sync::Arc,
};

use ahash::AHashMap;
use log::warn;

use crate::runtime::{
    DispatchConfig,
    Ident,
    Instance,
    Origin,
    RuntimeError,
    RuntimeResult,
    Value,
    REGISTRY_LOG,
};

/// A signature of the operation callables.
///
/// The first parameter is the receiver Instance, and the second is the list of
/// positional arguments. The callable may invoke other operations on the
/// receiver through [Instance::invoke].
pub type OperationFn = dyn Fn(&mut Instance, &[Value]) -> RuntimeResult<Value> + Send + Sync;

/// A named callable registered in a descriptor's operation table.
///
/// The [Display] implementation renders the operation's signature, such as
/// `fn bake(_)` when the arity is declared, or `fn bake(..)` otherwise.
#[derive(Clone)]
pub struct Operation {
    name: Ident,
    arity: Option<usize>,
    function: Arc<OperationFn>,
}

impl Debug for Operation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Operation")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl Display for Operation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("fn {}(", self.name))?;

        match self.arity {
            None => formatter.write_str("..")?,

            Some(arity) => {
                for index in 0..arity {
                    if index > 0 {
                        formatter.write_str(", ")?;
                    }

                    formatter.write_str("_")?;
                }
            }
        }

        formatter.write_str(")")
    }
}

impl Operation {
    /// Creates a variadic operation.
    pub fn new<F>(name: impl Into<Ident>, function: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity: None,
            function: Arc::new(function),
        }
    }

    /// Declares the exact number of arguments the operation accepts.
    ///
    /// Calls with a different number of arguments fail with the
    /// [ArityMismatch](RuntimeError::ArityMismatch) error before the
    /// callable is entered.
    #[inline(always)]
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);

        self
    }

    /// Returns the name of the operation.
    #[inline(always)]
    pub fn name(&self) -> &Ident {
        &self.name
    }

    /// Returns the declared number of arguments, or None if the operation is
    /// variadic.
    #[inline(always)]
    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// Calls the operation on the `receiver`.
    ///
    /// Each call counts towards the receiver's nesting depth, which is
    /// limited by the [stack_limit](DispatchConfig::stack_limit) of the
    /// receiver's descriptor.
    pub fn call(
        &self,
        origin: Origin,
        receiver: &mut Instance,
        arguments: &[Value],
    ) -> RuntimeResult<Value> {
        if let Some(arity) = self.arity {
            if arity != arguments.len() {
                return Err(RuntimeError::ArityMismatch {
                    access_origin: origin,
                    operation: self.name.clone(),
                    parameters: arity,
                    arguments: arguments.len(),
                });
            }
        }

        let limit = receiver.descriptor().config().stack_limit;

        if receiver.depth >= limit {
            return Err(RuntimeError::StackOverflow {
                access_origin: origin,
                operation: self.name.clone(),
                limit,
            });
        }

        receiver.depth += 1;
        let result = (self.function)(receiver, arguments);
        receiver.depth -= 1;

        result
    }
}

// Own operations of a single descriptor.
#[derive(Clone, Default)]
pub(crate) struct OperationTable {
    operations: AHashMap<Ident, Operation>,
}

impl OperationTable {
    #[track_caller]
    pub(crate) fn insert(&mut self, owner: &Ident, operation: Operation) {
        if self.operations.contains_key(operation.name()) {
            return Origin::caller().blame(&format!(
                "Operation '{}' registered more than once in '{owner}' cutter.",
                operation.name(),
            ));
        }

        let _ = self.operations.insert(operation.name.clone(), operation);
    }

    #[inline(always)]
    pub(crate) fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    #[inline(always)]
    pub(crate) fn names(&self) -> impl Iterator<Item = &Ident> + '_ {
        self.operations.keys()
    }

    pub(crate) fn check_reachability(&self, owner: &Ident, config: &DispatchConfig) {
        for name in self.operations.keys() {
            if config.is_reserved(name.as_str()) {
                warn!(
                    target: REGISTRY_LOG,
                    "Operation '{name}' of '{owner}' cutter is shadowed by the property accessors \
                    and cannot be invoked.",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{Operation, Value};

    #[test]
    fn test_operation_signature() {
        let variadic = Operation::new("bake", |_, _| Ok(Value::Nil));
        let binary = Operation::new("mix", |_, _| Ok(Value::Nil)).with_arity(2);

        assert_eq!(variadic.to_string(), "fn bake(..)");
        assert_eq!(binary.to_string(), "fn mix(_, _)");
        assert_eq!(binary.arity(), Some(2));
        assert_eq!(binary.name(), "mix");
    }
}
