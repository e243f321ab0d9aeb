//! nestify CLI crate
//!
//! Purpose:
//! - Command-line front end to the nestify resolution engine.
//! - Reads network descriptions from JSON or TOML files and writes resolved
//!   networks as JSON.
//!
//! Commands (see [commands]):
//! - resolve: one file in, resolved JSON out.
//! - merge: several files combined in precedence order, then resolved.
//! - layers: layer names grouped by area, expanded or flat.
//!
//! Notes:
//! - The binary (src/main.rs) wires up logging and argument parsing, calling NestifyCli::execute().
//! - Configuration (tree keys, output style) is read from TOML, see [config].

pub mod commands;
pub mod config;
pub mod error;
pub mod input;

pub use commands::NestifyCli;
