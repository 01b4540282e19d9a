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

//! # Cookie Cutter
//!
//! A minimal object system built from two pieces: descriptors ("cutters")
//! and instances ("cookies").
//!
//! A [Descriptor](runtime::Descriptor) is a named table of operations plus
//! an ordered list of delegate descriptors consulted when the table does not
//! know an operation. An [Instance](runtime::Instance) is a reference to
//! exactly one descriptor plus the instance's own declared properties. The
//! Instance holds no behavior: every call is resolved by name through the
//! descriptor and its delegates on each invocation.
//!
//! ```
//! use cookie_cutter::runtime::{Descriptor, Value};
//!
//! let nuts = Descriptor::builder("NutsCookie")
//!     .operation("contemplate", |cookie, _| {
//!         let time = cookie.invoke("bake", &[])?;
//!
//!         Ok(Value::from(format!("I need {time} minutes in the oven.")))
//!     })
//!     .build();
//!
//! let macadamia = Descriptor::builder("MacadamiaCookie")
//!     .operation("bake", |cookie, _| {
//!         match cookie.invoke("getColor", &[])? == "white" {
//!             true => Ok(Value::from("30")),
//!             false => Ok(Value::from("100")),
//!         }
//!     })
//!     .delegate(&nuts)
//!     .build();
//!
//! let mut white = macadamia.new_instance([("color", "white")]);
//!
//! assert_eq!(
//!     white.invoke("contemplate", &[]).unwrap(),
//!     "I need 30 minutes in the oven.",
//! );
//!
//! white.invoke("setColor", &[Value::from("dark")]).unwrap();
//!
//! assert_eq!(
//!     white.invoke("contemplate", &[]).unwrap(),
//!     "I need 100 minutes in the oven.",
//! );
//! ```
//!
//! Property accessors are synthesized from the operation names: `getColor`
//! reads the `color` property, and `setColor` writes it. Accessors never
//! create properties; the properties must be declared when the Instance is
//! created.
//!
//! The [ModalDescriptor](runtime::ModalDescriptor) is a variant of the
//! descriptor that picks its delegate by a caller-supplied mode instead of
//! the declaration order.
//!
//! The crate reports its activity through the [log](https://docs.rs/log)
//! facade under the [DISPATCH_LOG](runtime::DISPATCH_LOG) and
//! [REGISTRY_LOG](runtime::REGISTRY_LOG) targets, and never installs a logger
//! itself.

pub mod runtime;
