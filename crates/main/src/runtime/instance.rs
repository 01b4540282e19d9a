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

use log::trace;

use crate::runtime::{
    closeness::closest,
    Descriptor,
    DispatchConfig,
    Ident,
    ModalDescriptor,
    Origin,
    RuntimeError,
    RuntimeResult,
    Value,
    ValueStore,
    DISPATCH_LOG,
};

/// A shared reference to the descriptor an [Instance] is bound to.
///
/// The ordered and the parametric descriptors resolve operations differently,
/// so the reference keeps track of which kind it points to.
#[derive(Clone)]
pub enum DescriptorRef {
    /// A descriptor with an ordered delegate list.
    Ordered(Arc<Descriptor>),

    /// A descriptor that selects its delegate by mode.
    Modal(Arc<ModalDescriptor>),
}

impl Debug for DescriptorRef {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ordered(descriptor) => Debug::fmt(descriptor.as_ref(), formatter),
            Self::Modal(descriptor) => Debug::fmt(descriptor.as_ref(), formatter),
        }
    }
}

impl Display for DescriptorRef {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ordered(descriptor) => Display::fmt(descriptor.as_ref(), formatter),
            Self::Modal(descriptor) => Display::fmt(descriptor.as_ref(), formatter),
        }
    }
}

impl DescriptorRef {
    /// Returns the name of the referred descriptor.
    #[inline(always)]
    pub fn name(&self) -> &Ident {
        match self {
            Self::Ordered(descriptor) => descriptor.name(),
            Self::Modal(descriptor) => descriptor.name(),
        }
    }

    /// Returns the dispatch configuration of the referred descriptor.
    #[inline(always)]
    pub fn config(&self) -> &DispatchConfig {
        match self {
            Self::Ordered(descriptor) => descriptor.config(),
            Self::Modal(descriptor) => descriptor.config(),
        }
    }

    /// Returns a human-readable label of the referred descriptor.
    #[inline(always)]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

/// An object handle (a "cookie"): a reference to exactly one descriptor plus
/// the object's own [properties](ValueStore).
///
/// The Instance holds no operations. Every invocation is forwarded to the
/// descriptor, which resolves the operation and calls back into the Instance
/// to read or write its properties.
///
/// Instances are created with [Descriptor::new_instance] or
/// [ModalDescriptor::new_instance].
///
/// Invocation requires mutable access, so an Instance is confined to a single
/// owner at a time. To share an Instance between threads, wrap it into a lock.
pub struct Instance {
    descriptor: DescriptorRef,
    values: ValueStore,
    pub(crate) depth: usize,
}

impl Debug for Instance {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Instance")
            .field("descriptor", self.descriptor.name())
            .field("values", &self.values)
            .finish()
    }
}

impl Display for Instance {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.descriptor, formatter)
    }
}

impl Instance {
    #[inline(always)]
    pub(crate) fn new(descriptor: DescriptorRef, values: ValueStore) -> Self {
        trace!(
            target: DISPATCH_LOG,
            "New '{}' cookie with {} propert(ies).",
            descriptor.name(),
            values.len(),
        );

        Self {
            descriptor,
            values,
            depth: 0,
        }
    }

    /// Returns the descriptor this Instance is bound to.
    #[inline(always)]
    pub fn descriptor(&self) -> &DescriptorRef {
        &self.descriptor
    }

    /// Returns the Instance's properties.
    #[inline(always)]
    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    /// Returns the descriptor's label: `"<name> cutter"`.
    #[inline(always)]
    pub fn describe(&self) -> String {
        self.descriptor.describe()
    }

    /// Invokes the operation `name` with the `arguments`.
    ///
    /// The invocation is entirely delegated to the bound descriptor's
    /// dispatch function. For the [modal descriptors](ModalDescriptor), this
    /// function reaches only the property accessors and the descriptor's own
    /// operations; use [invoke_mode](Self::invoke_mode) to reach the mode
    /// delegates.
    #[track_caller]
    pub fn invoke(&mut self, name: &str, arguments: &[Value]) -> RuntimeResult<Value> {
        let origin = Origin::caller();

        match self.descriptor.clone() {
            DescriptorRef::Ordered(descriptor) => descriptor.dispatch(self, name, arguments),

            DescriptorRef::Modal(descriptor) => {
                descriptor.dispatch_with(origin, self, None, name, arguments)
            }
        }
    }

    /// Invokes the operation `name` with the `arguments` in the specified
    /// `mode`.
    ///
    /// If the Instance is bound to an ordered [Descriptor], the call fails
    /// with the [UnknownMode](RuntimeError::UnknownMode) error, because such
    /// descriptors do not dispatch by mode.
    #[track_caller]
    pub fn invoke_mode(
        &mut self,
        mode: &str,
        name: &str,
        arguments: &[Value],
    ) -> RuntimeResult<Value> {
        let origin = Origin::caller();

        match self.descriptor.clone() {
            DescriptorRef::Ordered(descriptor) => Err(RuntimeError::UnknownMode {
                access_origin: origin,
                receiver: descriptor.name().clone(),
                mode: Ident::from(mode),
                modes: Vec::new(),
            }),

            DescriptorRef::Modal(descriptor) => {
                descriptor.dispatch_with(origin, self, Some(mode), name, arguments)
            }
        }
    }

    /// Returns the value of the declared property `key`.
    ///
    /// Unlike the `get` accessors, the key is used as is, without case
    /// folding.
    #[track_caller]
    pub fn get(&self, key: &str) -> RuntimeResult<Value> {
        self.read_property(Origin::caller(), key)
    }

    /// Replaces the value of the declared property `key`.
    ///
    /// Unlike the `set` accessors, the key is used as is, without case
    /// folding.
    #[track_caller]
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> RuntimeResult<()> {
        self.write_property(Origin::caller(), key, value.into())
    }

    pub(crate) fn read_property(&self, origin: Origin, key: &str) -> RuntimeResult<Value> {
        match self.values.get(key) {
            Some(value) => Ok(value.clone()),
            None => Err(self.unknown_property(origin, key)),
        }
    }

    pub(crate) fn write_property(
        &mut self,
        origin: Origin,
        key: &str,
        value: Value,
    ) -> RuntimeResult<()> {
        match self.values.set(key, value) {
            Some(_) => Ok(()),
            None => Err(self.unknown_property(origin, key)),
        }
    }

    fn unknown_property(&self, origin: Origin, key: &str) -> RuntimeError {
        RuntimeError::UnknownProperty {
            access_origin: origin,
            receiver: self.descriptor.name().clone(),
            property: Ident::from(key),
            suggestion: closest(key, self.values.keys()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        Descriptor,
        DispatchConfig,
        Ident,
        RuntimeError,
        RuntimeResultExt,
        Value,
    };

    #[test]
    fn test_accessor_round_trip() {
        let plain = Descriptor::builder("PlainCookie").build();

        let mut cookie = plain.new_instance([
            ("color", Value::from("white")),
            ("weight", Value::from(12)),
            ("fresh", Value::from(true)),
        ]);

        assert_eq!(cookie.invoke("getColor", &[]).unwrap(), "white");
        assert_eq!(cookie.invoke("getWeight", &[]).unwrap(), 12.0);
        assert_eq!(cookie.invoke("getFresh", &[]).unwrap(), true);

        assert_eq!(
            cookie.invoke("setWeight", &[Value::from(15)]).unwrap(),
            Value::Nil,
        );
        assert_eq!(cookie.invoke("getWeight", &[]).unwrap(), 15.0);
        assert_eq!(cookie.get("weight").unwrap(), 15.0);

        cookie.set("color", "dark").unwrap();

        assert_eq!(cookie.invoke("getColor", &[]).unwrap(), "dark");
        assert_eq!(cookie.values().len(), 3);
    }

    #[test]
    fn test_accessors_never_declare() {
        let plain = Descriptor::builder("PlainCookie")
            .operation("size", |_, _| Ok(Value::from(3)))
            .build();

        let mut cookie = plain.new_instance([("color", "white")]);

        let Err(RuntimeError::UnknownProperty {
            receiver,
            property,
            suggestion,
            ..
        }) = cookie.invoke("setSize", &[Value::from(4)])
        else {
            panic!("unknown property expected");
        };

        assert_eq!(receiver, "PlainCookie");
        assert_eq!(property, "size");
        assert_eq!(suggestion, None);

        assert!(matches!(
            cookie.invoke("getSize", &[]),
            Err(RuntimeError::UnknownProperty { .. }),
        ));
        assert!(matches!(
            cookie.invoke("getColour", &[]),
            Err(RuntimeError::UnknownProperty { suggestion: Some(ref suggestion), .. })
                if suggestion == "color",
        ));
        assert!(cookie.get("size").is_err());
        assert!(!cookie.values().contains("size"));
        assert_eq!(cookie.invoke("size", &[]).unwrap(), 3.0);
    }

    #[test]
    fn test_self_invocation_observes_same_state() {
        let scale = Descriptor::builder("ScaleCookie")
            .operation("weigh", |cookie, _| cookie.invoke("getWeight", &[]))
            .operation("grow", |cookie, arguments| {
                let weight = cookie.invoke("getWeight", &[])?.as_number()?;
                let delta = arguments.first().cloned().unwrap_or(Value::from(1)).as_number()?;

                cookie.invoke("setWeight", &[Value::from(weight + delta)])?;

                cookie.invoke("weigh", &[])
            })
            .build();

        let mut cookie = scale.new_instance([("weight", 10)]);

        assert_eq!(
            cookie.invoke("weigh", &[]).unwrap(),
            cookie.invoke("getWeight", &[]).unwrap(),
        );
        assert_eq!(cookie.invoke("grow", &[Value::from(5)]).unwrap(), 15.0);
        assert_eq!(cookie.invoke("getWeight", &[]).unwrap(), 15.0);
        assert_eq!(cookie.invoke("weigh", &[]).unwrap(), 15.0);
    }

    #[test]
    fn test_stack_limit() {
        let mut config = DispatchConfig::new();

        config.stack_limit = 8;

        let endless = Descriptor::builder("EndlessCookie")
            .operation("forever", |cookie, _| cookie.invoke("forever", &[]))
            .operation("nested", |cookie, arguments| {
                let depth = arguments[0].as_number()?;

                match depth > 0.0 {
                    true => cookie.invoke("nested", &[Value::from(depth - 1.0)]),
                    false => Ok(Value::from("bottom")),
                }
            })
            .config(config)
            .build();

        let mut cookie = endless.new_instance([("color", "white")]);

        assert!(matches!(
            cookie.invoke("forever", &[]),
            Err(RuntimeError::StackOverflow { limit: 8, .. }),
        ));

        // The depth is restored after a failure.
        assert_eq!(
            cookie.invoke("nested", &[Value::from(7)]).unwrap(),
            "bottom"
        );
        assert!(matches!(
            cookie.invoke("nested", &[Value::from(8)]),
            Err(RuntimeError::StackOverflow { .. }),
        ));
    }

    #[test]
    fn test_ordered_instance_has_no_modes() {
        let plain = Descriptor::builder("PlainCookie").build();
        let mut cookie = plain.new_instance([("color", "white")]);

        assert!(matches!(
            cookie.invoke_mode("honest", "contemplate", &[]),
            Err(RuntimeError::UnknownMode { ref modes, .. }) if modes.is_empty(),
        ));
    }

    #[test]
    fn test_instance_formatting() {
        let plain = Descriptor::builder("PlainCookie").build();
        let cookie = plain.new_instance([("color", "white")]);

        assert_eq!(cookie.describe(), "PlainCookie cutter");
        assert_eq!(cookie.to_string(), "PlainCookie cutter");
        assert_eq!(cookie.descriptor().name(), &Ident::from("PlainCookie"));
        assert_eq!(
            format!("{cookie:?}"),
            r#"Instance { descriptor: "PlainCookie", values: {"color": String("white")} }"#,
        );
        assert_eq!(cookie.get("color").expect_blame("color is declared"), "white");
    }
}
