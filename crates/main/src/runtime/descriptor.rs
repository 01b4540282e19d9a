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

use log::{debug, trace};

use crate::runtime::{
    closeness::closest,
    operation::OperationTable,
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

/// A named collection of operations with an ordered list of delegate
/// descriptors (a "cutter").
///
/// The Descriptor does not own any instance data. Instances are created
/// through [Descriptor::new_instance], and every operation invoked on them is
/// resolved by name against this descriptor:
///
///  1. Property accessors (`getX` and `setX` with the
///     [default configuration](DispatchConfig)) read or write the Instance's
///     declared properties.
///  2. Otherwise, the operation is looked up in the descriptor's own
///     operation table.
///  3. Otherwise, the delegates are attempted in the declared order,
///     depth-first. A delegate that does not know the operation, or whose
///     operation fails with the
///     [UnknownOperation](RuntimeError::UnknownOperation) error, passes the
///     call to the next delegate. Any other result, including any other
///     error, is returned to the caller immediately.
///  4. If every delegate passes, the call fails with the UnknownOperation
///     error.
///
/// Delegates are shared [Arc] references to already built descriptors, and a
/// descriptor cannot be changed after it is built. Therefore, the delegation
/// graph is always acyclic.
///
/// ```
/// use cookie_cutter::runtime::{Descriptor, Value};
///
/// let nuts = Descriptor::builder("NutsCookie")
///     .operation("crack", |_, _| Ok(Value::from("crunch")))
///     .build();
///
/// let macadamia = Descriptor::builder("MacadamiaCookie")
///     .delegate(&nuts)
///     .build();
///
/// let mut cookie = macadamia.new_instance([("color", "white")]);
///
/// assert_eq!(cookie.invoke("crack", &[]).unwrap(), "crunch");
/// assert_eq!(cookie.invoke("getColor", &[]).unwrap(), "white");
/// assert_eq!(cookie.describe(), "MacadamiaCookie cutter");
/// ```
pub struct Descriptor {
    name: Ident,
    operations: OperationTable,
    delegates: Vec<Arc<Descriptor>>,
    config: DispatchConfig,
}

impl Debug for Descriptor {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let mut operations = self.operations.names().collect::<Vec<_>>();

        operations.sort();

        formatter
            .debug_struct("Descriptor")
            .field("name", &self.name)
            .field("operations", &operations)
            .field(
                "delegates",
                &self
                    .delegates
                    .iter()
                    .map(|delegate| &delegate.name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Display for Descriptor {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("{} cutter", self.name))
    }
}

impl Descriptor {
    /// Starts building a new descriptor with the specified `name`.
    #[inline(always)]
    pub fn builder(name: impl Into<Ident>) -> DescriptorBuilder {
        DescriptorBuilder {
            name: name.into(),
            operations: OperationTable::default(),
            delegates: Vec::new(),
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

    /// Returns the delegates of this descriptor in the declared order.
    #[inline(always)]
    pub fn delegates(&self) -> &[Arc<Descriptor>] {
        &self.delegates
    }

    /// Returns an iterator over the names of the descriptor's own operations,
    /// excluding the operations of the delegates, in unspecified order.
    #[inline(always)]
    pub fn operations(&self) -> impl Iterator<Item = &Ident> + '_ {
        self.operations.names()
    }

    /// Creates a new Instance bound to this descriptor with the declared
    /// properties `values`.
    ///
    /// This is the only way to construct an Instance.
    #[inline(always)]
    pub fn new_instance(self: &Arc<Self>, values: impl Into<ValueStore>) -> Instance {
        Instance::new(DescriptorRef::Ordered(self.clone()), values.into())
    }

    /// Returns true if the operation `name` can be resolved through this
    /// descriptor's own table or any of its delegates.
    ///
    /// Property accessors are not operations, and this function does not
    /// report them.
    #[inline(always)]
    pub fn implements(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Finds the operation `name` in this descriptor's own table, or in its
    /// delegates in the declared order.
    ///
    /// The operation is not invoked. This is the operation
    /// [dispatch](Self::dispatch) tries first; if a delegate's operation
    /// fails with [UnknownOperation](RuntimeError::UnknownOperation) at run
    /// time, dispatch moves on to the next delegate.
    pub fn resolve(&self, name: &str) -> Option<&Operation> {
        if let Some(operation) = self.operations.get(name) {
            return Some(operation);
        }

        for delegate in &self.delegates {
            if let Some(operation) = delegate.resolve(name) {
                return Some(operation);
            }
        }

        None
    }

    /// Returns the names of the descriptors the lookup of the operation
    /// `name` walks through, starting with this descriptor and ending with the
    /// descriptor that owns the operation.
    ///
    /// Returns None if the operation cannot be resolved.
    pub fn resolution_path(&self, name: &str) -> Option<Vec<Ident>> {
        if self.operations.get(name).is_some() {
            return Some(vec![self.name.clone()]);
        }

        for delegate in &self.delegates {
            if let Some(mut path) = delegate.resolution_path(name) {
                path.insert(0, self.name.clone());

                return Some(path);
            }
        }

        None
    }

    /// Dispatches the invocation of `name` with the `arguments` on the
    /// `instance`.
    ///
    /// The request is classified by this descriptor's
    /// [configuration](DispatchConfig) and resolved as described in the
    /// [type-level documentation](Descriptor).
    ///
    /// Errors raised by the descriptor's own operation are returned
    /// unchanged. During the delegate search, only the UnknownOperation
    /// errors of the delegates continue the search; the delegate search
    /// never masks other errors.
    #[track_caller]
    pub fn dispatch(
        &self,
        instance: &mut Instance,
        name: &str,
        arguments: &[Value],
    ) -> RuntimeResult<Value> {
        let origin = Origin::caller();

        match Request::classify(&self.config, origin, name, arguments)? {
            Request::Get(property) => instance.read_property(origin, property.as_str()),

            Request::Set(property, value) => {
                instance.write_property(origin, property.as_str(), value)?;

                Ok(Value::Nil)
            }

            Request::Named(operation, arguments) => {
                self.dispatch_named(origin, instance, &operation, arguments)
            }
        }
    }

    pub(crate) fn dispatch_named(
        &self,
        origin: Origin,
        instance: &mut Instance,
        name: &Ident,
        arguments: &[Value],
    ) -> RuntimeResult<Value> {
        if let Some(operation) = self.operations.get(name.as_str()) {
            return operation.call(origin, instance, arguments);
        }

        for delegate in &self.delegates {
            if let Some(result) = delegate.attempt(origin, instance, name, arguments) {
                return result;
            }
        }

        debug!(
            target: DISPATCH_LOG,
            "[{origin}] '{name}' is not resolvable through '{}' cutter.", self.name,
        );

        Err(RuntimeError::UnknownOperation {
            access_origin: origin,
            receiver: self.name.clone(),
            operation: name.clone(),
            suggestion: closest(name.as_str(), self.reachable_operations().iter()),
        })
    }

    // Dispatches the operation on behalf of a delegating descriptor.
    //
    // Returns None if neither this descriptor nor its delegates serve the
    // operation, or if the serving operation fails with UnknownOperation.
    // Any other outcome of the serving operation is final.
    fn attempt(
        &self,
        origin: Origin,
        instance: &mut Instance,
        name: &Ident,
        arguments: &[Value],
    ) -> Option<RuntimeResult<Value>> {
        if let Some(operation) = self.operations.get(name.as_str()) {
            return match operation.call(origin, instance, arguments) {
                Err(RuntimeError::UnknownOperation { operation: missing, .. }) => {
                    trace!(
                        target: DISPATCH_LOG,
                        "[{origin}] '{name}' of '{}' delegate failed on unknown '{missing}'. \
                        Trying the next delegate.",
                        self.name,
                    );

                    None
                }

                result => {
                    trace!(
                        target: DISPATCH_LOG,
                        "[{origin}] '{name}' served by '{}' delegate.", self.name,
                    );

                    Some(result)
                }
            };
        }

        for delegate in &self.delegates {
            if let Some(result) = delegate.attempt(origin, instance, name, arguments) {
                return Some(result);
            }
        }

        None
    }

    fn reachable_operations(&self) -> Vec<Ident> {
        let mut result = self.operations.names().cloned().collect::<Vec<_>>();

        for delegate in &self.delegates {
            result.append(&mut delegate.reachable_operations());
        }

        result
    }
}

/// A builder of the [Descriptor] objects.
///
/// Created with the [Descriptor::builder] function.
#[must_use]
pub struct DescriptorBuilder {
    name: Ident,
    operations: OperationTable,
    delegates: Vec<Arc<Descriptor>>,
    config: DispatchConfig,
}

impl DescriptorBuilder {
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

    /// Registers an operation under the `name` that accepts exactly `arity`
    /// arguments.
    ///
    /// # Panics
    ///
    /// Panics if an operation with the same name is already registered in
    /// this builder.
    #[inline(always)]
    #[track_caller]
    pub fn operation_with_arity<F>(self, name: impl Into<Ident>, arity: usize, function: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        self.register(Operation::new(name, function).with_arity(arity))
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

    /// Appends a delegate to the end of the delegate list.
    ///
    /// The same delegate may be shared by any number of descriptors.
    #[inline(always)]
    pub fn delegate(mut self, delegate: &Arc<Descriptor>) -> Self {
        self.delegates.push(delegate.clone());

        self
    }

    /// Sets the dispatch configuration of the descriptor.
    #[inline(always)]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;

        self
    }

    /// Finishes the descriptor.
    ///
    /// Operations whose names are classified as property accessors under the
    /// configuration are unreachable. The builder keeps them but reports each
    /// of them through a warning log record.
    pub fn build(self) -> Arc<Descriptor> {
        self.operations.check_reachability(&self.name, &self.config);

        debug!(
            target: REGISTRY_LOG,
            "'{}' cutter built with {} delegate(s).",
            self.name,
            self.delegates.len(),
        );

        Arc::new(Descriptor {
            name: self.name,
            operations: self.operations,
            delegates: self.delegates,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use crate::runtime::{Descriptor, DispatchConfig, Ident, RuntimeError, Value, ValueStore};

    fn nuts() -> Arc<Descriptor> {
        Descriptor::builder("NutsCookie")
            .operation("contemplate", |cookie, _| {
                let time = cookie.invoke("bake", &[])?;

                Ok(Value::from(format!(
                    "I am a nut cookie and I need {time} minutes in the oven."
                )))
            })
            .build()
    }

    fn macadamia() -> Arc<Descriptor> {
        Descriptor::builder("MacadamiaCookie")
            .operation_with_arity("bake", 0, |cookie, _| {
                match cookie.invoke("getColor", &[])? == "white" {
                    true => Ok(Value::from("30")),
                    false => Ok(Value::from("100")),
                }
            })
            .delegate(&nuts())
            .build()
    }

    #[test]
    fn test_delegated_contemplation() {
        let macadamia = macadamia();

        let mut white = macadamia.new_instance([("color", "white")]);
        let mut dark = macadamia.new_instance([("color", "dark")]);

        assert_eq!(
            white.invoke("contemplate", &[]).unwrap(),
            "I am a nut cookie and I need 30 minutes in the oven.",
        );
        assert_eq!(
            dark.invoke("contemplate", &[]).unwrap(),
            "I am a nut cookie and I need 100 minutes in the oven.",
        );

        white.invoke("setColor", &[Value::from("dark")]).unwrap();

        assert_eq!(
            white.invoke("contemplate", &[]).unwrap(),
            "I am a nut cookie and I need 100 minutes in the oven.",
        );
    }

    #[test]
    fn test_unknown_operation() {
        let macadamia = macadamia();
        let mut cookie = macadamia.new_instance([("color", "white")]);

        let error = cookie.invoke("contempalte", &[]).unwrap_err();

        let RuntimeError::UnknownOperation {
            receiver,
            operation,
            suggestion,
            ..
        } = error
        else {
            panic!("unexpected error kind");
        };

        assert_eq!(receiver, "MacadamiaCookie");
        assert_eq!(operation, "contempalte");
        assert_eq!(suggestion, Some(Ident::from("contemplate")));

        let lonely = Descriptor::builder("LonelyCookie").build();
        let mut cookie = lonely.new_instance([("color", "white")]);

        assert!(matches!(
            cookie.invoke("bake", &[]),
            Err(RuntimeError::UnknownOperation {
                suggestion: None,
                ..
            }),
        ));
    }

    #[test]
    fn test_delegate_order() {
        let first = Descriptor::builder("First")
            .operation("x", |_, _| Ok(Value::from("first")))
            .build();

        let second = Descriptor::builder("Second")
            .operation("x", |_, _| Ok(Value::from("second")))
            .operation("y", |_, _| Ok(Value::from("second")))
            .build();

        let forward = Descriptor::builder("Forward")
            .delegate(&first)
            .delegate(&second)
            .build();

        let backward = Descriptor::builder("Backward")
            .delegate(&second)
            .delegate(&first)
            .build();

        let mut cookie = forward.new_instance(ValueStore::new());

        assert_eq!(cookie.invoke("x", &[]).unwrap(), "first");
        assert_eq!(cookie.invoke("y", &[]).unwrap(), "second");

        let mut cookie = backward.new_instance(ValueStore::new());

        assert_eq!(cookie.invoke("x", &[]).unwrap(), "second");
    }

    #[test]
    fn test_own_operation_shadows_delegates() {
        let base = Descriptor::builder("Base")
            .operation("x", |_, _| Ok(Value::from("base")))
            .build();

        let derived = Descriptor::builder("Derived")
            .operation("x", |_, _| Ok(Value::from("derived")))
            .delegate(&base)
            .build();

        let mut cookie = derived.new_instance(ValueStore::new());

        assert_eq!(cookie.invoke("x", &[]).unwrap(), "derived");
        assert_eq!(
            derived.resolution_path("x").unwrap(),
            vec![Ident::from("Derived")]
        );
    }

    #[test]
    fn test_delegate_search_continues_on_unknown_operation_only() {
        let second_calls = Arc::new(AtomicUsize::new(0));
        let fallback_calls = Arc::new(AtomicUsize::new(0));

        let first = Descriptor::builder("First")
            .operation("x", |cookie, _| cookie.invoke("missing", &[]))
            .build();

        let second = {
            let second_calls = second_calls.clone();

            Descriptor::builder("Second")
                .operation("x", move |_, _| {
                    let _ = second_calls.fetch_add(1, Ordering::SeqCst);

                    Ok(Value::from("second"))
                })
                .build()
        };

        let failing = Descriptor::builder("Failing")
            .operation("y", |_, _| Err(RuntimeError::custom("burnt")))
            .build();

        let fallback = {
            let fallback_calls = fallback_calls.clone();

            Descriptor::builder("Fallback")
                .operation("y", move |_, _| {
                    let _ = fallback_calls.fetch_add(1, Ordering::SeqCst);

                    Ok(Value::from("fallback"))
                })
                .build()
        };

        let cutter = Descriptor::builder("Cutter")
            .delegate(&first)
            .delegate(&second)
            .delegate(&failing)
            .delegate(&fallback)
            .build();

        let mut cookie = cutter.new_instance(ValueStore::new());

        assert_eq!(cookie.invoke("x", &[]).unwrap(), "second");
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);

        assert!(matches!(
            cookie.invoke("y", &[]),
            Err(RuntimeError::Custom { ref message, .. }) if message == "burnt",
        ));
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_nested_delegate_falls_through() {
        let broken = Descriptor::builder("Broken")
            .operation("x", |cookie, _| cookie.invoke("missing", &[]))
            .build();

        let middle = Descriptor::builder("Middle").delegate(&broken).build();

        let working = Descriptor::builder("Working")
            .operation("x", |_, _| Ok(Value::from("working")))
            .build();

        let cutter = Descriptor::builder("Cutter")
            .delegate(&middle)
            .delegate(&working)
            .build();

        let mut cookie = cutter.new_instance(ValueStore::new());

        assert_eq!(cookie.invoke("x", &[]).unwrap(), "working");

        let lonely = Descriptor::builder("Lonely").delegate(&middle).build();
        let mut cookie = lonely.new_instance(ValueStore::new());

        assert!(matches!(
            cookie.invoke("x", &[]),
            Err(RuntimeError::UnknownOperation { ref receiver, ref operation, .. })
                if receiver == "Lonely" && operation == "x",
        ));
    }

    #[test]
    fn test_own_operation_errors_propagate() {
        let delegate = Descriptor::builder("Delegate")
            .operation("x", |_, _| Ok(Value::from("delegate")))
            .build();

        let cutter = Descriptor::builder("Cutter")
            .operation("x", |cookie, _| cookie.invoke("missing", &[]))
            .delegate(&delegate)
            .build();

        let mut cookie = cutter.new_instance(ValueStore::new());

        assert!(matches!(
            cookie.invoke("x", &[]),
            Err(RuntimeError::UnknownOperation { ref operation, .. }) if operation == "missing",
        ));
    }

    #[test]
    fn test_diamond_delegation() {
        let root = Descriptor::builder("Root")
            .operation("x", |_, _| Ok(Value::from("root")))
            .build();

        let left = Descriptor::builder("Left").delegate(&root).build();
        let right = Descriptor::builder("Right").delegate(&root).build();

        let bottom = Descriptor::builder("Bottom")
            .delegate(&left)
            .delegate(&right)
            .build();

        assert!(bottom.implements("x"));
        assert!(!bottom.implements("getX"));
        assert_eq!(
            bottom.resolution_path("x").unwrap(),
            vec![
                Ident::from("Bottom"),
                Ident::from("Left"),
                Ident::from("Root"),
            ],
        );
        assert_eq!(bottom.resolution_path("z"), None);
    }

    #[test]
    fn test_accessor_priority() {
        let shadowed = Descriptor::builder("Shadowed")
            .operation("getFlavor", |_, _| Ok(Value::from("operation")))
            .build();

        let mut cookie = shadowed.new_instance([("color", "white")]);

        assert!(matches!(
            cookie.invoke("getFlavor", &[]),
            Err(RuntimeError::UnknownProperty { ref property, .. }) if property == "flavor",
        ));

        let mut config = DispatchConfig::new();

        config.get_prefix = "";

        let reachable = Descriptor::builder("Reachable")
            .operation("getFlavor", |_, _| Ok(Value::from("operation")))
            .config(config)
            .build();

        let mut cookie = reachable.new_instance([("color", "white")]);

        assert_eq!(cookie.invoke("getFlavor", &[]).unwrap(), "operation");
    }

    #[test]
    fn test_declared_arity() {
        let macadamia = macadamia();
        let mut cookie = macadamia.new_instance([("color", "white")]);

        assert!(matches!(
            cookie.invoke("bake", &[Value::from(1)]),
            Err(RuntimeError::ArityMismatch {
                parameters: 0,
                arguments: 1,
                ..
            }),
        ));
    }

    #[test]
    #[should_panic(expected = "registered more than once")]
    fn test_duplicate_operation() {
        let _ = Descriptor::builder("Twice")
            .operation("x", |_, _| Ok(Value::Nil))
            .operation("x", |_, _| Ok(Value::Nil));
    }

    #[test]
    fn test_descriptor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}

        let macadamia = macadamia();

        assert_send_sync(&macadamia);
        assert_eq!(macadamia.describe(), "MacadamiaCookie cutter");
        assert_eq!(
            format!("{macadamia:?}"),
            r#"Descriptor { name: "MacadamiaCookie", operations: ["bake"], delegates: ["NutsCookie"] }"#,
        );
    }
}
