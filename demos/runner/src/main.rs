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

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use cookie_cutter::runtime::{Descriptor, ModalDescriptor, RuntimeResult, Value};
use log::{debug, info, warn, LevelFilter};

use crate::logger::StderrLogger;

mod logger;

/// Cookie Cutter demo
#[derive(Parser)]
#[command(about)]
struct Cli {
    /// The color of the macadamia cookie.
    /// The default value is "white".
    #[arg(short, long, default_value_t = String::from("white"))]
    color: String,

    /// The mood of the peanut cookie: "beachbody" or "honest".
    /// The default value is "honest".
    #[arg(short, long, default_value_t = String::from("honest"))]
    mode: String,

    /// The weight of the peanut cookie in grams.
    /// The default value is 20.
    #[arg(short, long, default_value_t = 20.0)]
    weight: f64,

    /// Log level of the dispatch engine records printed to stderr.
    /// Disabled by default.
    #[arg(short, long, default_value_t = LevelFilter::Off)]
    log: LevelFilter,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    StderrLogger::setup(cli.log);

    if let Err(error) = run(&cli) {
        eprintln!("Dispatch failure: {}", error.primary_description());
        eprintln!("{}", error.summary());
        eprintln!("  at {}", error.primary_origin());

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(cli: &Cli) -> RuntimeResult<()> {
    let macadamia = macadamia_cutter();

    let mut cookie = macadamia.new_instance([("color", cli.color.as_str())]);

    for (key, value) in cookie.values().iter() {
        debug!("{} cookie property '{key}' = {value}.", cookie.descriptor().name());
    }

    info!("Contemplating {} cookie.", cookie.describe());

    println!("{}", cookie.invoke("contemplate", &[])?);

    let peanut = peanut_cutter();

    let mut cookie = peanut.new_instance([("weight", cli.weight)]);

    info!("Contemplating {} cookie in '{}' mode.", cookie.describe(), cli.mode);

    println!("{}", cookie.invoke_mode(&cli.mode, "contemplate", &[])?);

    if !cookie.invoke("eat", &[])?.is_nil() {
        warn!("Eating the {} cookie produced a value.", cookie.descriptor().name());
    }

    println!("{}", cookie.invoke_mode(&cli.mode, "contemplate", &[])?);

    Ok(())
}

fn macadamia_cutter() -> Arc<Descriptor> {
    let nuts = Descriptor::builder("NutsCookie")
        .operation("contemplate", |cookie, _| {
            let time = cookie.invoke("bake", &[])?;

            Ok(Value::from(format!(
                "I am a {} and I need {time} minutes in the oven.",
                cookie.descriptor().name(),
            )))
        })
        .build();

    Descriptor::builder("MacadamiaCookie")
        .operation_with_arity("bake", 0, |cookie, _| {
            match cookie.invoke("getColor", &[])? == "white" {
                true => Ok(Value::from("30")),
                false => Ok(Value::from("100")),
            }
        })
        .delegate(&nuts)
        .build()
}

fn peanut_cutter() -> Arc<ModalDescriptor> {
    let beachbody = Descriptor::builder("BeachbodyCookie")
        .operation("contemplate", |cookie, _| {
            let weight = cookie.invoke("getWeight", &[])?;

            Ok(Value::from(format!(
                "I weigh {weight} grams. Still too heavy for the beach."
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

            cookie.invoke("setWeight", &[Value::from((weight - 5.0).max(0.0))])?;

            Ok(Value::Nil)
        })
        .mode("beachbody", &beachbody)
        .mode("honest", &honest)
        .build()
}
