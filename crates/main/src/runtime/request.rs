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

use log::trace;

use crate::runtime::{
    DispatchConfig,
    Ident,
    Origin,
    RuntimeError,
    RuntimeResult,
    Value,
    DISPATCH_LOG,
};

/// A classified dispatch request.
///
/// Every invocation by name is first turned into a Request: the reserved
/// accessor forms are recognized by the
/// [configured prefixes](DispatchConfig::get_prefix), and everything else is
/// a named operation call resolved through the descriptor's operation table
/// and its delegates.
///
/// Accessor forms take priority, so an operation literally named `getX` or
/// `setX` can never be reached.
#[derive(Clone, Debug, PartialEq)]
pub enum Request<'a> {
    /// Reads the property.
    Get(Ident),

    /// Writes the value into the property.
    Set(Ident, Value),

    /// Calls the named operation with the arguments.
    Named(Ident, &'a [Value]),
}

impl<'a> Display for Request<'a> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get(property) => formatter.write_fmt(format_args!("get '{property}'")),

            Self::Set(property, value) => {
                formatter.write_fmt(format_args!("set '{property}' = {value:?}"))
            }

            Self::Named(operation, arguments) => formatter.write_fmt(format_args!(
                "call '{operation}' with {} argument(s)",
                arguments.len()
            )),
        }
    }
}

impl<'a> Request<'a> {
    /// Classifies the invocation of `name` with the `arguments`.
    ///
    /// Returns an [ArityMismatch](RuntimeError::ArityMismatch) error if the
    /// name denotes a setter but the number of arguments is not exactly one,
    /// or if the name denotes a getter but arguments are provided.
    pub fn classify(
        config: &DispatchConfig,
        origin: Origin,
        name: &str,
        arguments: &'a [Value],
    ) -> RuntimeResult<Self> {
        let request = if let Some(suffix) = config.strip_set(name) {
            let [value] = arguments else {
                return Err(RuntimeError::ArityMismatch {
                    access_origin: origin,
                    operation: Ident::from(name),
                    parameters: 1,
                    arguments: arguments.len(),
                });
            };

            Self::Set(Self::property(config, suffix), value.clone())
        } else if let Some(suffix) = config.strip_get(name) {
            if !arguments.is_empty() {
                return Err(RuntimeError::ArityMismatch {
                    access_origin: origin,
                    operation: Ident::from(name),
                    parameters: 0,
                    arguments: arguments.len(),
                });
            }

            Self::Get(Self::property(config, suffix))
        } else {
            Self::Named(Ident::from(name), arguments)
        };

        trace!(target: DISPATCH_LOG, "[{origin}] Request {name:?} classified as {request}.");

        Ok(request)
    }

    #[inline(always)]
    fn property(config: &DispatchConfig, suffix: &str) -> Ident {
        match config.fold_case {
            true => Ident::lowercase(suffix),
            false => Ident::from(suffix),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{DispatchConfig, Ident, Origin, Request, RuntimeError, Value};

    #[test]
    fn test_accessor_classification() {
        let config = DispatchConfig::new();
        let arguments = [Value::from("dark")];

        assert_eq!(
            Request::classify(&config, Origin::nil(), "getWeight", &[]).unwrap(),
            Request::Get(Ident::from("weight")),
        );

        assert_eq!(
            Request::classify(&config, Origin::nil(), "setColor", &arguments).unwrap(),
            Request::Set(Ident::from("color"), Value::from("dark")),
        );

        assert_eq!(
            Request::classify(&config, Origin::nil(), "bake", &arguments).unwrap(),
            Request::Named(Ident::from("bake"), &arguments),
        );
    }

    #[test]
    fn test_accessor_arity() {
        let config = DispatchConfig::new();

        let error = Request::classify(&config, Origin::nil(), "setColor", &[]).unwrap_err();

        assert!(matches!(
            error,
            RuntimeError::ArityMismatch {
                parameters: 1,
                arguments: 0,
                ..
            }
        ));

        let error =
            Request::classify(&config, Origin::nil(), "getColor", &[Value::Nil]).unwrap_err();

        assert!(matches!(
            error,
            RuntimeError::ArityMismatch {
                parameters: 0,
                arguments: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_custom_prefixes() {
        let mut config = DispatchConfig::new();

        config.get_prefix = "read_";
        config.set_prefix = "";
        config.fold_case = false;

        assert_eq!(
            Request::classify(&config, Origin::nil(), "read_Color", &[]).unwrap(),
            Request::Get(Ident::from("Color")),
        );

        assert_eq!(
            Request::classify(&config, Origin::nil(), "getColor", &[]).unwrap(),
            Request::Named(Ident::from("getColor"), &[]),
        );

        assert_eq!(
            Request::classify(&config, Origin::nil(), "setColor", &[]).unwrap(),
            Request::Named(Ident::from("setColor"), &[]),
        );
    }
}
