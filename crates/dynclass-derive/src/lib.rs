// dynclass-derive: compile-time schema extraction for Rust structs
//
// Provides:
// - #[derive(Describe)] - implements dynclass_engine::Describe
//
// Example:
// ```
// use dynclass_engine::Describe;
//
// #[derive(Describe)]
// struct Person {
//     #[describe(rename = "Name")]
//     name: String,
//     #[attribute(Range, min = 0, max = 150)]
//     age: i32,
// }
// ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod describe;

/// Derives `dynclass_engine::Describe` for a struct with named fields.
///
/// Every field becomes a property named after the field and typed by the
/// field's `StaticType`. Object-level extraction reads the value through
/// `ToValue`.
///
/// # Field attributes
///
/// - `#[describe(rename = "Name")]`: property name
/// - `#[describe(description = "...")]`: property description
/// - `#[describe(skip)]`: leave the field out
/// - `#[attribute(Label, key = value, ...)]`: attach ad hoc metadata named
///   `Label`; may be repeated
///
/// # Example
///
/// ```ignore
/// #[derive(Describe)]
/// struct Order {
///     #[describe(description = "Order number")]
///     #[attribute(Display, order = 1)]
///     id: i64,
///     #[describe(skip)]
///     cache: Vec<u8>,
/// }
///
/// let schema = dynclass_engine::extract::schema_of_type::<Order>();
/// ```
#[proc_macro_derive(Describe, attributes(describe, attribute))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    describe::expand_describe(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
