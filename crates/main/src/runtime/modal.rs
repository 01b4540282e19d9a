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
use log::{debug, trace};

use crate::runtime::{
    closeness::closest,
    operation::OperationTable,
    Descriptor,
    DescriptorRef,
    DispatchConfig,
    Ident,
    Instance,
    Operation,
    Origin,
    Request,
    RuntimeError,
    RuntimeResult,
    Value,
    ValueStore,
    DISPATCH_LOG,
    REGISTRY_LOG,
};

/// A descriptor that selects its delegate by a caller-supplied mode rather
/// than by the declaration order.
///
/// Instead of an ordered delegate list, the ModalDescriptor maps each mode to
/// exactly one delegate [Descriptor]. A request is resolved as follows:
///
///  1. Property accessors read or write the Instance's declared properties.
///  2. Otherwise, the operation is looked up in the descriptor's own
///     operation table.
///  3. Otherwise, the delegate registered for the mode serves the call, or
///     the call fails with the [UnknownMode](RuntimeError::UnknownMode)
///     error if there is no such mode.
///
/// Instances of a ModalDescriptor use [Instance::invoke_mode] to pass the
/// mode. [Instance::invoke] on them only reaches the accessors and the
/// descriptor's own operations.
///
/// ```
/// use cookie_cutter::runtime::{Descriptor, ModalDescriptor, Value};
///
/// let cheerful = Descriptor::builder("Cheerful")
///     .operation("greet", |_, _| Ok(Value::from("hello!")))
///     .build();
///
/// let grumpy = Descriptor::builder("Grumpy")
///     .operation("greet", |_, _| Ok(Value::from("go away")))
///     .build();
///
/// let moody = ModalDescriptor::builder("MoodyCookie")
///     .mode("cheerful", &cheerful)
///     .mode("grumpy", &grumpy)
///     .build();
///
/// let mut cookie = moody.new_instance([("color", "white")]);
///
/// assert_eq!(cookie.invoke_mode("cheerful", "greet", &[]).unwrap(), "hello!");
/// assert_eq!(cookie.invoke_mode("grumpy", "greet", &[]).unwrap(), "go away");
/// assert!(cookie.invoke_mode("sleepy", "greet", &[]).is_err());
/// ```
pub struct ModalDescriptor {
    name: Ident,
    operations: OperationTable,
    modes: AHashMap<Ident, Arc<Descriptor>>,
    config: DispatchConfig,
}

impl Debug for ModalDescriptor {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let mut operations = self.operations.names().collect::<Vec<_>>();

        operations.sort();

        let mut modes = self
            .modes
            .iter()
            .map(|(mode, delegate)| (mode, delegate.name()))
            .collect::<Vec<_>>();

        modes.sort();

        formatter
            .debug_struct("ModalDescriptor")
            .field("name", &self.name)
            .field("operations", &operations)
            .field("modes", &modes)
            .finish()
    }
}

impl Display for ModalDescriptor {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("{} cutter", self.name))
    }
}

impl ModalDescriptor {
    /// Starts building a new modal descriptor with the specified `name`.
    #[inline(always)]
    pub fn builder(name: impl Into<Ident>) -> ModalDescriptorBuilder {
        ModalDescriptorBuilder {
            name: name.into(),
            operations: OperationTable::default(),
            modes: AHashMap::new(),
            config: DispatchConfig::new(),
        }
    }

    /// Returns the name of the descriptor.
    #[inline(always)]
    pub fn name(&self) -> &Ident {
        &self.name
    }

    /// Returns a human-readable label of the descriptor: `"<name> cutter"`.
    #[inline(always)]
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Returns the dispatch configuration of this descriptor.
    #[inline(always)]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Returns the delegate registered for the `mode`, if any.
    #[inline(always)]
    pub fn mode(&self, mode: &str) -> Option<&Arc<Descriptor>> {
        self.modes.get(mode)
    }

    /// Returns all supported modes in alphabetical order.
    pub fn modes(&self) -> Vec<Ident> {
        let mut modes = self.modes.keys().cloned().collect::<Vec<_>>();

        modes.sort();

        modes
    }

    /// Returns an iterator over the names of the descriptor's own operations
    /// in unspecified order.
    #[inline(always)]
    pub fn operations(&self) -> impl Iterator<Item = &Ident> + '_ {
        self.operations.names()
    }

    /// Creates a new Instance bound to this descriptor with the declared
    /// properties `values`.
    #[inline(always)]
    pub fn new_instance(self: &Arc<Self>, values: impl Into<ValueStore>) -> Instance {
        Instance::new(DescriptorRef::Modal(self.clone()), values.into())
    }

    /// Dispatches the invocation of `name` with the `arguments` on the
    /// `instance` in the specified `mode`.
    ///
    /// The mode is consulted only if the request is neither a property
    /// accessor nor one of the descriptor's own operations.
    #[track_caller]
    pub fn dispatch(
        &self,
        instance: &mut Instance,
        mode: &str,
        name: &str,
        arguments: &[Value],
    ) -> RuntimeResult<Value> {
        let origin = Origin::caller();

        self.dispatch_with(origin, instance, Some(mode), name, arguments)
    }

    pub(crate) fn dispatch_with(
        &self,
        origin: Origin,
        instance: &mut Instance,
        mode: Option<&str>,
        name: &str,
        arguments: &[Value],
    ) -> RuntimeResult<Value> {
        let (operation, arguments) =
            match Request::classify(&self.config, origin, name, arguments)? {
                Request::Get(property) => {
                    return instance.read_property(origin, property.as_str());
                }

                Request::Set(property, value) => {
                    instance.write_property(origin, property.as_str(), value)?;

                    return Ok(Value::Nil);
                }

                Request::Named(operation, arguments) => (operation, arguments),
            };

        if let Some(local) = self.operations.get(operation.as_str()) {
            return local.call(origin, instance, arguments);
        }

        let Some(mode) = mode else {
            debug!(
                target: DISPATCH_LOG,
                "[{origin}] '{operation}' is not an own operation of '{}' cutter, and no mode \
                is specified.",
                self.name,
            );

            return Err(RuntimeError::UnknownOperation {
                access_origin: origin,
                receiver: self.name.clone(),
                operation: operation.clone(),
                suggestion: closest(operation.as_str(), self.operations.names()),
            });
        };

        let Some(delegate) = self.modes.get(mode) else {
            debug!(
                target: DISPATCH_LOG,
                "[{origin}] '{}' cutter does not have mode '{mode}'.", self.name,
            );

            return Err(RuntimeError::UnknownMode {
                access_origin: origin,
                receiver: self.name.clone(),
                mode: Ident::from(mode),
                modes: self.modes(),
            });
        };

        trace!(
            target: DISPATCH_LOG,
            "[{origin}] '{operation}' of '{}' cutter forwarded to '{}' in '{mode}' mode.",
            self.name,
            delegate.name(),
        );

        delegate.dispatch_named(origin, instance, &operation, arguments)
    }
}

/// A builder of the [ModalDescriptor] objects.
///
/// Created with the [ModalDescriptor::builder] function.
#[must_use]
pub struct ModalDescriptorBuilder {
    name: Ident,
    operations: OperationTable,
    modes: AHashMap<Ident, Arc<Descriptor>>,
    config: DispatchConfig,
}

impl ModalDescriptorBuilder {
    /// Registers a variadic operation under the `name`.
    ///
    /// # Panics
    ///
    /// Panics if an operation with the same name is already registered in
    /// this builder.
    #[inline(always)]
    #[track_caller]
    pub fn operation<F>(self, name: impl Into<Ident>, function: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        self.register(Operation::new(name, function))
    }

    /// Registers a prepared [Operation].
    ///
    /// # Panics
    ///
    /// Panics if an operation with the same name is already registered in
    /// this builder.
    #[inline(always)]
    #[track_caller]
    pub fn register(mut self, operation: Operation) -> Self {
        self.operations.insert(&self.name, operation);

        self
    }

    /// Registers the `delegate` for the `mode`.
    ///
    /// # Panics
    ///
    /// Panics if the mode is already registered in this builder.
    #[track_caller]
    pub fn mode(mut self, mode: impl Into<Ident>, delegate: &Arc<Descriptor>) -> Self {
        let mode = mode.into();

        if self.modes.contains_key(&mode) {
            return Origin::caller().blame(&format!(
                "Mode '{mode}' registered more than once in '{}' cutter.",
                self.name,
            ));
        }

        let _ = self.modes.insert(mode, delegate.clone());

        self
    }

    /// Sets the dispatch configuration of the descriptor.
    #[inline(always)]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;

        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> Arc<ModalDescriptor> {
        self.operations.check_reachability(&self.name, &self.config);

        debug!(
            target: REGISTRY_LOG,
            "'{}' cutter built with {} mode(s).",
            self.name,
            self.modes.len(),
        );

        Arc::new(ModalDescriptor {
            name: self.name,
            operations: self.operations,
            modes: self.modes,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::runtime::{Descriptor, Ident, ModalDescriptor, RuntimeError, Value};

    fn peanut() -> Arc<ModalDescriptor> {
        let beachbody = Descriptor::builder("BeachbodyCookie")
            .operation("contemplate", |cookie, _| {
                let weight = cookie.invoke("getWeight", &[])?;

                Ok(Value::from(format!(
                    "I weigh {weight} grams and I am still too heavy."
                )))
            })
            .build();

        let honest = Descriptor::builder("HonestCookie")
            .operation("contemplate", |cookie, _| {
                let weight = cookie.invoke("getWeight", &[])?;

                Ok(Value::from(format!("I weigh {weight} grams.")))
            })
            .build();

        ModalDescriptor::builder("PeanutCookie")
            .operation("eat", |cookie, _| {
                let weight = cookie.invoke("getWeight", &[])?.as_number()?;

                cookie.invoke("setWeight", &[Value::from(weight - 1.0)])?;

                Ok(Value::Nil)
            })
            .mode("beachbody", &beachbody)
            .mode("honest", &honest)
            .build()
    }

    #[test]
    fn test_mode_selects_delegate() {
        let peanut = peanut();
        let mut cookie = peanut.new_instance([("weight", 20)]);

        assert_eq!(
            cookie.invoke_mode("beachbody", "contemplate", &[]).unwrap(),
            "I weigh 20 grams and I am still too heavy.",
        );
        assert_eq!(
            cookie.invoke_mode("honest", "contemplate", &[]).unwrap(),
            "I weigh 20 grams.",
        );

        cookie.invoke("eat", &[]).unwrap();

        assert_eq!(
            cookie.invoke_mode("honest", "contemplate", &[]).unwrap(),
            "I weigh 19 grams.",
        );
    }

    #[test]
    fn test_unknown_mode() {
        let peanut = peanut();
        let mut cookie = peanut.new_instance([("weight", 20)]);

        let Err(RuntimeError::UnknownMode {
            receiver,
            mode,
            modes,
            ..
        }) = cookie.invoke_mode("honets", "contemplate", &[])
        else {
            panic!("unknown mode expected");
        };

        assert_eq!(receiver, "PeanutCookie");
        assert_eq!(mode, "honets");
        assert_eq!(modes, vec![Ident::from("beachbody"), Ident::from("honest")]);
    }

    #[test]
    fn test_own_operations_ignore_mode() {
        let peanut = peanut();
        let mut cookie = peanut.new_instance([("weight", 20)]);

        cookie.invoke_mode("unknown", "eat", &[]).unwrap();

        assert_eq!(cookie.invoke_mode("unknown", "getWeight", &[]).unwrap(), 19.0);
    }

    #[test]
    fn test_mode_delegate_misses() {
        let peanut = peanut();
        let mut cookie = peanut.new_instance([("weight", 20)]);

        assert!(matches!(
            cookie.invoke_mode("honest", "bake", &[]),
            Err(RuntimeError::UnknownOperation { ref receiver, .. }) if receiver == "HonestCookie",
        ));

        assert!(matches!(
            cookie.invoke("contemplate", &[]),
            Err(RuntimeError::UnknownOperation { ref receiver, .. }) if receiver == "PeanutCookie",
        ));
    }

    #[test]
    #[should_panic(expected = "registered more than once")]
    fn test_duplicate_mode() {
        let delegate = Descriptor::builder("Delegate").build();

        let _ = ModalDescriptor::builder("Twice")
            .mode("honest", &delegate)
            .mode("honest", &delegate);
    }

    #[test]
    fn test_modal_debug() {
        let peanut = peanut();

        assert_eq!(peanut.describe(), "PeanutCookie cutter");
        assert_eq!(
            format!("{peanut:?}"),
            "ModalDescriptor { name: \"PeanutCookie\", operations: [\"eat\"], modes: \
            [(\"beachbody\", \"BeachbodyCookie\"), (\"honest\", \"HonestCookie\")] }",
        );
        assert!(peanut.mode("honest").is_some());
        assert!(peanut.mode("sleepy").is_none());
    }
}
