use proc_macro::TokenStream;
use syn::parse_macro_input;
use syn::DeriveInput;

mod attrs;
mod generate;

/// Derive macro implementing `proxycheck_validate::Validate` for a message struct.
///
/// Fields are checked in declaration order. For each field the presence rule
/// runs first, then length/pattern/range rules, then recursion into the value
/// if it is itself a message.
///
/// # Field classification
///
/// - `String`, numeric primitives and `bool` (and `Option`s of them) are
///   scalars: only the declared rules apply.
/// - `Vec<T>` is repeated; `HashMap<K, V>` / `BTreeMap<K, V>` is a map.
/// - Any other type is treated as a message and must implement `Validate`.
///   Use `#[validate(skip)]` for foreign types that carry no rules.
///
/// # Container attributes
///
/// - `#[validate(type_name = "Name")]`: name reported in errors (defaults to
///   the struct identifier).
///
/// # Field attributes
///
/// - `required`: the `Option` must be `Some`.
/// - `min_len = n`, `max_len = n`: code-point length bounds on strings.
/// - `pattern = "regex"`: non-empty strings must match. The pattern is checked
///   when the macro expands and compiled once per process.
/// - `range(gt = a, gte = a, lt = b, lte = b)`: numeric bounds.
/// - `min_items = n`, `max_items = n`: element count of a repeated field.
/// - `min_pairs = n`, `max_pairs = n`, `keys(min_len = n, max_len = n)`: map rules.
/// - `oneof`: the field is an `Option<U>` where `U` derives `Oneof`; combine
///   with `required` to reject an unset union.
/// - `name = "Name"`: field name reported in errors (defaults to PascalCase).
/// - `skip`: no rules and no recursion.
///
/// # Example
///
/// ```ignore
/// use proxycheck_validate::Validate;
///
/// #[derive(Validate)]
/// #[validate(type_name = "OAuth2Credentials")]
/// struct Credentials {
///     #[validate(min_len = 1)]
///     client_id: String,
///     #[validate(required)]
///     token_secret: Option<SecretRef>,
///     #[validate(oneof, required)]
///     token_formation: Option<TokenFormation>,
/// }
/// ```
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate::expand_validate(input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive macro implementing `proxycheck_validate::Oneof` for a union enum.
///
/// Every variant must be a tuple variant with exactly one field. Variant
/// rules use the same attributes as struct fields and are reported against
/// the variant's name (the identifier unless `name = "..."` is given), on
/// behalf of the message that holds the union.
///
/// Patterns on variants are registered under the enum's own path, so the
/// same union may be held by any number of message types.
///
/// # Example
///
/// ```ignore
/// use proxycheck_validate::Oneof;
///
/// #[derive(Oneof)]
/// enum TokenFormation {
///     #[validate(required)]
///     HmacSecret(Option<SecretRef>),
/// }
/// ```
#[proc_macro_derive(Oneof, attributes(validate))]
pub fn derive_oneof(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate::expand_oneof(input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
