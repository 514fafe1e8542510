//! GraphWeave Core Library
//!
//! This crate provides the fundamental types and error handling for the
//! GraphWeave query compiler.
//!
//! # Overview
//!
//! GraphWeave compiles declarative selection trees into parameterized Cypher
//! programs. Compilation is a pure tree transform; everything here is plain
//! data shared by the model, builder and translate layers.
//!
//! # Modules
//!
//! - `error` - Error types and result aliases
//! - `value` - Parameter literal values
//! - `temporal` - Duration decomposition and datetime validation
//! - `spatial` - Point comparison values

pub mod error;
pub mod spatial;
pub mod temporal;
pub mod value;

pub use error::{Error, Result};
pub use spatial::{PointInput, validate_distance};
pub use temporal::{DurationComponents, validate_datetime};
pub use value::CypherValue;
