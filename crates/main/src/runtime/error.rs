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
    error::Error as StdError,
    fmt::{Debug, Display, Formatter},
    result::Result as StdResult,
    sync::Arc,
};

use crate::runtime::{closeness::closest, Ident, Origin};

/// A result of a runtime API call, which can either be a normal value or a
/// [RuntimeError].
pub type RuntimeResult<T> = StdResult<T, RuntimeError>;

/// A helper trait for the [RuntimeResult] object.
///
/// This trait is automatically implemented for RuntimeResult and provides the
/// [expect_blame](Self::expect_blame) function, which either unwraps the
/// underlying value or panics if the result is [Err], indicating where the
/// RuntimeError [originated](RuntimeError::primary_origin).
pub trait RuntimeResultExt {
    /// The [Ok] type of the underlying [Result].
    type OkType;

    /// If the result is [Ok], returns the underlying data; otherwise, panics
    /// at the location where the RuntimeError
    /// [originated](RuntimeError::primary_origin).
    fn expect_blame(self, message: &str) -> Self::OkType;
}

impl<T> RuntimeResultExt for RuntimeResult<T> {
    type OkType = T;

    #[inline(always)]
    fn expect_blame(self, message: &str) -> Self::OkType {
        match self {
            Ok(ok) => ok,
            Err(error) => error.primary_origin().blame(&format!("{message}\n{error}")),
        }
    }
}

/// Represents any error that may occur during the dispatch of an operation.
///
/// This object implements the [Debug] and [Display] traits. The Display
/// implementation provides a brief description of the underlying error, and
/// the [summary](RuntimeError::summary) function provides a longer
/// explanation with a hint when one is available.
///
/// Only the [UnknownOperation](RuntimeError::UnknownOperation) error is
/// recoverable during the delegate search: the search moves to the next
/// delegate when a delegate does not know the operation, or when the
/// delegate's operation fails with this error. Any other error raised by a
/// delegate's operation terminates the call and reaches the caller
/// unchanged.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum RuntimeError {
    /// The operation name is not found in the descriptor's own operation
    /// table, nor in any of its delegates.
    UnknownOperation {
        /// The Rust source code location where the operation was requested.
        access_origin: Origin,

        /// The name of the descriptor that received the request.
        receiver: Ident,

        /// The name of the requested operation.
        operation: Ident,

        /// The most similar operation name known to the descriptor, if any.
        suggestion: Option<Ident>,
    },

    /// A property accessor addresses a property that is not declared in the
    /// Instance's value store.
    UnknownProperty {
        /// The Rust source code location where the property was accessed.
        access_origin: Origin,

        /// The name of the descriptor of the accessed Instance.
        receiver: Ident,

        /// The name of the property.
        property: Ident,

        /// The most similar declared property name, if any.
        suggestion: Option<Ident>,
    },

    /// A parametric dispatch requests a mode that has no delegate.
    UnknownMode {
        /// The Rust source code location where the mode was requested.
        access_origin: Origin,

        /// The name of the descriptor that received the request.
        receiver: Ident,

        /// The requested mode.
        mode: Ident,

        /// All modes the descriptor supports, in alphabetical order.
        modes: Vec<Ident>,
    },

    /// An accessor or an operation with a declared arity was called with an
    /// incorrect number of arguments.
    ArityMismatch {
        /// The Rust source code location where the operation was requested.
        access_origin: Origin,

        /// The name of the operation or the accessor.
        operation: Ident,

        /// The expected number of arguments.
        parameters: usize,

        /// The actual number of arguments that were passed during the
        /// invocation.
        arguments: usize,
    },

    /// A value was interpreted as a type it does not hold.
    TypeMismatch {
        /// The Rust source code location where the value was accessed.
        access_origin: Origin,

        /// The name of the expected type.
        expected: &'static str,

        /// The name of the actual type of the value.
        actual: &'static str,
    },

    /// Operations invoked each other on the same Instance deeper than the
    /// [configured limit](crate::runtime::DispatchConfig::stack_limit).
    StackOverflow {
        /// The Rust source code location where the limit was exceeded.
        access_origin: Origin,

        /// The operation that was about to be entered.
        operation: Ident,

        /// The nesting limit.
        limit: usize,
    },

    /// An operation reported a failure of its own.
    Custom {
        /// The Rust source code location where the error was raised.
        access_origin: Origin,

        /// A description of the failure.
        message: String,

        /// An underlying error, if any.
        cause: Option<Arc<dyn StdError + Send + Sync + 'static>>,
    },
}

impl Display for RuntimeError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownOperation {
                receiver,
                operation,
                ..
            } => formatter.write_fmt(format_args!(
                "'{receiver}' cutter does not have operation '{operation}'"
            )),

            Self::UnknownProperty {
                receiver, property, ..
            } => formatter.write_fmt(format_args!(
                "'{receiver}' cookie does not have property '{property}'"
            )),

            Self::UnknownMode { receiver, mode, .. } => formatter.write_fmt(format_args!(
                "'{receiver}' cutter does not have mode '{mode}'"
            )),

            Self::ArityMismatch {
                operation,
                parameters,
                arguments,
                ..
            } => match *parameters == 1 {
                true => formatter.write_fmt(format_args!(
                    "'{operation}' requires 1 argument, but {arguments} provided"
                )),
                false => formatter.write_fmt(format_args!(
                    "'{operation}' requires {parameters} arguments, but {arguments} provided"
                )),
            },

            Self::TypeMismatch {
                expected, actual, ..
            } => formatter.write_fmt(format_args!(
                "expected {expected}, but '{actual}' value provided"
            )),

            Self::StackOverflow {
                operation, limit, ..
            } => formatter.write_fmt(format_args!(
                "dispatch stack overflow: '{operation}' exceeds {limit} nested invocations"
            )),

            Self::Custom { message, .. } => formatter.write_str(message),
        }
    }
}

impl StdError for RuntimeError {
    #[inline]
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Custom {
                cause: Some(cause), ..
            } => Some(&**cause),
            _ => None,
        }
    }
}

impl RuntimeError {
    /// Creates a [Custom](Self::Custom) error originating from the caller.
    ///
    /// Operation callables use this function to report their own failures.
    #[inline(always)]
    #[track_caller]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            access_origin: Origin::caller(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a [Custom](Self::Custom) error with an underlying `cause`
    /// originating from the caller.
    #[inline(always)]
    #[track_caller]
    pub fn with_cause(
        message: impl Into<String>,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Custom {
            access_origin: Origin::caller(),
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    /// Returns the Rust source code location where the error occurred.
    pub fn primary_origin(&self) -> &Origin {
        match self {
            Self::UnknownOperation { access_origin, .. } => access_origin,

            Self::UnknownProperty { access_origin, .. } => access_origin,

            Self::UnknownMode { access_origin, .. } => access_origin,

            Self::ArityMismatch { access_origin, .. } => access_origin,

            Self::TypeMismatch { access_origin, .. } => access_origin,

            Self::StackOverflow { access_origin, .. } => access_origin,

            Self::Custom { access_origin, .. } => access_origin,
        }
    }

    /// Returns an error message string.
    ///
    /// This function returns the same message string that you would get by
    /// formatting RuntimeError using the Display implementation.
    #[inline(always)]
    pub fn primary_description(&self) -> String {
        self.to_string()
    }

    /// Returns a detailed summary of this error, including a hint about a
    /// similar name when one is known.
    pub fn summary(&self) -> String {
        match self {
            Self::UnknownOperation {
                receiver,
                suggestion,
                ..
            } => {
                let mut summary = format!(
                    "The operation is resolved in the own operation table of \
                    '{receiver}' cutter first,\nthen in its delegates in the \
                    declared order, and none of them defines it."
                );

                if let Some(suggestion) = suggestion {
                    summary.push_str(&format!("\n\nDid you mean '{suggestion}'?"));
                }

                summary
            }

            Self::UnknownProperty {
                property,
                suggestion,
                ..
            } => {
                let mut summary = format!(
                    "Property accessors never create properties. The property \
                    '{property}' must be\ndeclared in the initial values of the \
                    cookie."
                );

                if let Some(suggestion) = suggestion {
                    summary.push_str(&format!("\n\nDid you mean '{suggestion}'?"));
                }

                summary
            }

            Self::UnknownMode { mode, modes, .. } => {
                let mut summary = match modes.is_empty() {
                    true => String::from("This cutter does not dispatch by mode."),

                    false => {
                        let modes = modes
                            .iter()
                            .map(|mode| format!("'{mode}'"))
                            .collect::<Vec<_>>()
                            .join(", ");

                        format!("Available modes are: {modes}.")
                    }
                };

                if let Some(suggestion) = closest(mode.as_str(), modes) {
                    summary.push_str(&format!("\n\nDid you mean '{suggestion}'?"));
                }

                summary
            }

            Self::ArityMismatch { .. } => String::from(
                "Property setters require exactly one argument, property getters \
                do not accept\narguments, and operations with declared arity \
                require exactly that many.",
            ),

            Self::TypeMismatch { .. } => String::from(
                "Values are dynamically typed. Check the value's type before \
                interpreting it.",
            ),

            Self::StackOverflow { .. } => String::from(
                "Operations that invoke other operations on their receiver form \
                a call chain.\nThis chain is likely unbounded. Check the \
                operations for infinite recursion,\nor raise the stack limit \
                in the dispatch configuration.",
            ),

            Self::Custom { cause, .. } => match cause {
                Some(cause) => format!("Caused by: {cause}"),
                None => String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error, fmt::Error as FmtError};

    use crate::runtime::{Ident, Origin, RuntimeError, RuntimeResult, RuntimeResultExt};

    #[test]
    fn test_error_descriptions() {
        let error = RuntimeError::UnknownOperation {
            access_origin: Origin::nil(),
            receiver: Ident::from("MacadamiaCookie"),
            operation: Ident::from("contempalte"),
            suggestion: Some(Ident::from("contemplate")),
        };

        assert_eq!(
            error.to_string(),
            "'MacadamiaCookie' cutter does not have operation 'contempalte'",
        );
        assert_eq!(error.primary_description(), error.to_string());
        assert!(error.summary().ends_with("Did you mean 'contemplate'?"));

        let error = RuntimeError::UnknownMode {
            access_origin: Origin::nil(),
            receiver: Ident::from("PeanutCookie"),
            mode: Ident::from("honets"),
            modes: vec![Ident::from("beachbody"), Ident::from("honest")],
        };

        assert_eq!(
            error.summary(),
            "Available modes are: 'beachbody', 'honest'.\n\nDid you mean 'honest'?",
        );
    }

    #[test]
    fn test_custom_error_cause() {
        let error = RuntimeError::with_cause("oven failure", FmtError);

        assert_eq!(error.to_string(), "oven failure");
        assert!(error.source().is_some());
        assert!(error.primary_origin().to_string().contains("error.rs"));
        assert!(RuntimeError::custom("burnt").source().is_none());
    }

    #[test]
    #[should_panic(expected = "baking failed")]
    fn test_expect_blame() {
        let result: RuntimeResult<()> = Err(RuntimeError::custom("burnt"));

        result.expect_blame("baking failed");
    }
}
