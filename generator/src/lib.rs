// Licensed under the Apache-2.0 license

//! Generator for device pin-mapping headers.
//!
//! Reads the family CSV tables describing the pin multiplexing of a
//! microcontroller family and produces, per device variant, a
//! `pin_mapping-<device>.h` header with configuration-wizard annotations,
//! peripheral information classes and pin alias declarations, a
//! `gpio-<device>.cpp` source with the reset-time pin-mapping function,
//! and optionally an XML description of the family.
//!
//! The crate is organised as:
//! - [`parser`]: reads the CSV tables into the device model
//! - [`model`]: pins, signals, peripherals and their templates
//! - [`patterns`]: fallback classifier for unclaimed signal names
//! - [`writers`]: per-peripheral-class code-writer strategies
//! - [`output`]: text-emission primitives for the generated C files
//! - [`codegen`]: the header, source and XML generators

pub mod codegen;
pub mod model;
pub mod output;
pub mod parser;
pub mod patterns;
pub mod util;
pub mod writers;

pub use codegen::{generate_header, generate_source, write_all};
pub use model::DeviceInfo;
pub use parser::{parse, parse_file};
