//! Procedural macros for the O language compiler.
//!
//! This crate provides derive macros for error handling in the O compiler,
//! specifically the `OError` derive macro that automatically implements
//! the `DiagnosticInfo` for error types with rich diagnostic information.

use proc_macro::TokenStream;
use crate::error::o_error;
mod error;

/// Derive macro for implementing `DiagnosticInfo` on error structs
/// 
/// This macro automatically generates implementations that provide rich error
/// diagnostics with source code locations, labels, help text, and error chaining.
/// 
/// # Attributes
/// - `source_code` - Marks fields containing source code information
/// - `label` - Marks fields that provide error labels for specific locations
/// - `help` - Marks fields containing help text for the error
/// - `diagnostic` - Marks fields with diagnostic messages
/// - `errors` - Marks fields containing nested errors
/// - `reference` - Marks fields containing error references
#[proc_macro_derive(OError, attributes(source_code, label, help, diagnostic, errors, reference))]
pub fn derive_oerror(input: TokenStream) -> TokenStream {
    o_error(input)
}
