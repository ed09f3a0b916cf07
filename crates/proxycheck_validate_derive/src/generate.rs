use proc_macro2::Span;
use proc_macro2::TokenStream;
use quote::format_ident;
use quote::quote;
use syn::Data;
use syn::DeriveInput;
use syn::Error;
use syn::Expr;
use syn::Fields;
use syn::GenericArgument;
use syn::LitStr;
use syn::PathArguments;
use syn::Result;
use syn::Type;
use syn::TypePath;

use crate::attrs;
use crate::attrs::FieldRules;
use crate::attrs::RangeRule;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scalar {
    Str,
    Number,
    Bool,
}

enum Shape {
    Scalar(Scalar),
    Optional(Scalar),
    Message,
    OptionalMessage,
    Repeated { messages: bool },
    Map { messages: bool },
}

impl Shape {
    fn of(ty: &Type) -> Self {
        if let Some(scalar) = scalar_kind(ty) {
            return Shape::Scalar(scalar);
        }
        if let Some(inner) = single_type_arg(ty, "Option") {
            return match scalar_kind(&inner) {
                Some(scalar) => Shape::Optional(scalar),
                None => Shape::OptionalMessage,
            };
        }
        if let Some(inner) = single_type_arg(ty, "Vec") {
            return Shape::Repeated {
                messages: scalar_kind(&inner).is_none(),
            };
        }
        if let Some((_, value)) = map_types(ty) {
            return Shape::Map {
                messages: scalar_kind(&value).is_none(),
            };
        }
        Shape::Message
    }

    /// Rules that make sense for a value of this shape.
    fn allowed(&self) -> &'static [&'static str] {
        const STRING_RULES: &[&str] = &["min_len", "max_len", "pattern"];
        match self {
            Shape::Scalar(Scalar::Str) => STRING_RULES,
            Shape::Scalar(Scalar::Number) => &["range"],
            Shape::Scalar(Scalar::Bool) => &[],
            Shape::Optional(Scalar::Str) => &["required", "min_len", "max_len", "pattern"],
            Shape::Optional(Scalar::Number) => &["required", "range"],
            Shape::Optional(Scalar::Bool) => &["required"],
            Shape::Message => &[],
            Shape::OptionalMessage => &["required"],
            Shape::Repeated { .. } => &["min_items", "max_items"],
            Shape::Map { .. } => &["min_pairs", "max_pairs", "keys"],
        }
    }
}

/// One field (or union variant) being generated for.
struct Target<'a> {
    /// Name reported in errors
    name: String,
    /// Expression evaluating to `&FieldType`
    value: TokenStream,
    ty: &'a Type,
    rules: FieldRules,
    span: Span,
    /// Registry key for the field's pattern when it differs from the
    /// reporting type name
    pattern_key: Option<TokenStream>,
}

pub fn expand_validate(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let container = attrs::parse_container(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    name,
                    "Validate only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                name,
                "Validate only supports structs; derive Oneof for unions",
            ));
        }
    };

    let type_name = container
        .type_name
        .as_ref()
        .map(LitStr::value)
        .unwrap_or_else(|| name.to_string());

    let mut checks = Vec::new();
    let mut registrations = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let rules = attrs::parse_field(&field.attrs)?;
        let target = Target {
            name: rules
                .name
                .as_ref()
                .map(LitStr::value)
                .unwrap_or_else(|| pascal_case(&ident.to_string())),
            value: quote! { &self.#ident },
            ty: &field.ty,
            rules,
            span: ident.span(),
            pattern_key: None,
        };

        checks.push(generate_checks(&target)?);
        if let Some(pattern) = &target.rules.pattern {
            registrations.push(generate_registration(
                &quote! { #type_name },
                &format!("{}_{}", type_name, target.name),
                &target.name,
                pattern,
            ));
        }
    }

    let body = if checks.iter().all(TokenStream::is_empty) {
        quote! {}
    } else {
        quote! {
            let fields = ::proxycheck_validate::Fields::new(#type_name);
            #(#checks)*
        }
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::proxycheck_validate::Validate for #name #ty_generics #where_clause {
            fn validate(&self) -> ::core::result::Result<(), ::proxycheck_validate::ValidationError> {
                #body
                ::core::result::Result::Ok(())
            }
        }

        #(#registrations)*
    })
}

pub fn expand_oneof(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let container = attrs::parse_container(&input.attrs)?;

    if let Some(type_name) = &container.type_name {
        return Err(Error::new(
            type_name.span(),
            "unions report against the message that holds them",
        ));
    }

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(Error::new_spanned(name, "Oneof only supports enums"));
        }
    };

    if variants.is_empty() {
        return Err(Error::new_spanned(
            name,
            "Oneof needs at least one variant",
        ));
    }

    // Variant patterns are keyed by the enum itself so any message may hold it
    let enum_name = name.to_string();
    let registry_key = quote! {
        ::core::concat!(::core::module_path!(), "::", #enum_name)
    };

    let mut check_arms = Vec::new();
    let mut registrations = Vec::new();
    for variant in variants {
        let ident = &variant.ident;
        let ty = match &variant.fields {
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => &fields.unnamed[0].ty,
            _ => {
                return Err(Error::new_spanned(
                    variant,
                    "Oneof variants must hold exactly one unnamed field",
                ));
            }
        };

        let rules = attrs::parse_field(&variant.attrs)?;
        if rules.oneof {
            return Err(Error::new_spanned(
                variant,
                "a union variant cannot itself be a union",
            ));
        }

        let target = Target {
            name: rules
                .name
                .as_ref()
                .map(LitStr::value)
                .unwrap_or_else(|| ident.to_string()),
            value: quote! { value },
            ty,
            rules,
            span: ident.span(),
            pattern_key: Some(registry_key.clone()),
        };

        let checks = generate_checks(&target)?;
        if let Some(pattern) = &target.rules.pattern {
            registrations.push(generate_registration(
                &registry_key,
                &format!("{}_{}", name, ident),
                &target.name,
                pattern,
            ));
        }

        check_arms.push(if checks.is_empty() {
            quote! { Self::#ident(_) => {} }
        } else {
            quote! { Self::#ident(value) => { #checks } }
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::proxycheck_validate::Oneof for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn validate_variant(
                &self,
                fields: &::proxycheck_validate::Fields,
            ) -> ::core::result::Result<(), ::proxycheck_validate::ValidationError> {
                match self {
                    #(#check_arms)*
                }
                ::core::result::Result::Ok(())
            }
        }

        #(#registrations)*
    })
}

fn generate_checks(target: &Target) -> Result<TokenStream> {
    let rules = &target.rules;
    let name = &target.name;
    let value = &target.value;

    if rules.skip {
        if rules.declared().len() > 1 {
            return Err(Error::new(target.span, "`skip` cannot be combined with other rules"));
        }
        return Ok(quote! {});
    }

    if rules.oneof {
        if single_type_arg(target.ty, "Option").is_none() {
            return Err(Error::new(target.span, "`oneof` fields must be Option<Union>"));
        }
        if let Some(extra) = rules
            .declared()
            .into_iter()
            .find(|rule| *rule != "oneof" && *rule != "required")
        {
            return Err(Error::new(
                target.span,
                format!("`{}` cannot be applied to a oneof field", extra),
            ));
        }
        let required = rules.required;
        return Ok(quote! {
            fields.oneof(#name, (#value).as_ref(), #required)?;
        });
    }

    let shape = Shape::of(target.ty);
    let allowed = shape.allowed();
    if let Some(rule) = rules.declared().into_iter().find(|rule| !allowed.contains(rule)) {
        return Err(Error::new(
            target.span,
            format!("`{}` does not apply to a field of this type", rule),
        ));
    }

    let mut checks = Vec::new();
    match shape {
        Shape::Scalar(_) => {
            checks.extend(scalar_checks(target, value));
        }
        Shape::Optional(_) => {
            if rules.required {
                checks.push(quote! { fields.required(#name, (#value).as_ref())?; });
            }
            let inner = scalar_checks(target, &quote! { value });
            if !inner.is_empty() {
                checks.push(quote! {
                    if let ::core::option::Option::Some(value) = #value {
                        #(#inner)*
                    }
                });
            }
        }
        Shape::Message => {
            checks.push(quote! { fields.embedded(#name, #value)?; });
        }
        Shape::OptionalMessage => {
            if rules.required {
                checks.push(quote! { fields.required(#name, (#value).as_ref())?; });
            }
            checks.push(quote! { fields.embedded(#name, #value)?; });
        }
        Shape::Repeated { messages } => {
            if let Some(min) = &rules.min_items {
                checks.push(quote! { fields.min_items(#name, (#value).len(), #min)?; });
            }
            if let Some(max) = &rules.max_items {
                checks.push(quote! { fields.max_items(#name, (#value).len(), #max)?; });
            }
            if messages {
                checks.push(quote! { fields.repeated(#name, #value)?; });
            }
        }
        Shape::Map { messages } => {
            if let Some(min) = &rules.min_pairs {
                checks.push(quote! { fields.min_pairs(#name, (#value).len(), #min)?; });
            }
            if let Some(max) = &rules.max_pairs {
                checks.push(quote! { fields.max_pairs(#name, (#value).len(), #max)?; });
            }
            let mut key_rules = Vec::new();
            if let Some(min) = &rules.key_min_len {
                key_rules.push(quote! { ::proxycheck_validate::rules::min_len(key, #min)?; });
            }
            if let Some(max) = &rules.key_max_len {
                key_rules.push(quote! { ::proxycheck_validate::rules::max_len(key, #max)?; });
            }
            if !key_rules.is_empty() {
                checks.push(quote! {
                    fields.map_keys(#name, (#value).keys(), |key| {
                        #(#key_rules)*
                        ::core::result::Result::Ok(())
                    })?;
                });
            }
            if messages {
                checks.push(quote! { fields.map_values(#name, #value)?; });
            }
        }
    }

    Ok(quote! { #(#checks)* })
}

/// Length, pattern and range checks against `value: &T`.
fn scalar_checks(target: &Target, value: &TokenStream) -> Vec<TokenStream> {
    let name = &target.name;
    let rules = &target.rules;
    let mut checks = Vec::new();

    if let Some(min) = &rules.min_len {
        checks.push(quote! { fields.min_len(#name, #value, #min)?; });
    }
    if let Some(max) = &rules.max_len {
        checks.push(quote! { fields.max_len(#name, #value, #max)?; });
    }
    if rules.pattern.is_some() {
        checks.push(match &target.pattern_key {
            Some(key) => quote! { fields.pattern_for(#key, #name, #value)?; },
            None => quote! { fields.pattern(#name, #value)?; },
        });
    }
    if let Some(range) = &rules.range {
        let bound = numeric_bound(range);
        checks.push(quote! { fields.range(#name, #value, &#bound)?; });
    }

    checks
}

fn numeric_bound(range: &RangeRule) -> TokenStream {
    fn bound(included: &Option<Expr>, excluded: &Option<Expr>) -> TokenStream {
        match (included, excluded) {
            (Some(value), _) => quote! { ::core::ops::Bound::Included(#value) },
            (None, Some(value)) => quote! { ::core::ops::Bound::Excluded(#value) },
            (None, None) => quote! { ::core::ops::Bound::Unbounded },
        }
    }

    let lower = bound(&range.gte, &range.gt);
    let upper = bound(&range.lte, &range.lt);
    quote! { ::proxycheck_validate::NumericBound::new(#lower, #upper) }
}

/// Register a field's pattern in the link-time table read by `PatternCache`.
fn generate_registration(
    key: &TokenStream,
    unique: &str,
    field: &str,
    pattern: &LitStr,
) -> TokenStream {
    let static_name = format_ident!("__PROXYCHECK_PATTERN_{}", sanitize(unique));

    quote! {
        #[::proxycheck_validate::__private::linkme::distributed_slice(::proxycheck_validate::VALIDATION_PATTERNS)]
        #[linkme(crate = ::proxycheck_validate::__private::linkme)]
        #[doc(hidden)]
        static #static_name: ::proxycheck_validate::PatternSpec =
            ::proxycheck_validate::PatternSpec::new(#key, #field, #pattern);
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// `client_id` -> `ClientId`
fn pascal_case(ident: &str) -> String {
    ident
        .trim_start_matches("r#")
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn single_type_arg(ty: &Type, wrapper: &str) -> Option<Type> {
    if let Type::Path(TypePath { path, .. }) = ty {
        if let Some(segment) = path.segments.last() {
            if segment.ident == wrapper {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if args.args.len() == 1 {
                        if let GenericArgument::Type(inner) = &args.args[0] {
                            return Some(inner.clone());
                        }
                    }
                }
            }
        }
    }
    None
}

fn map_types(ty: &Type) -> Option<(Type, Type)> {
    if let Type::Path(TypePath { path, .. }) = ty {
        if let Some(segment) = path.segments.last() {
            if segment.ident != "HashMap" && segment.ident != "BTreeMap" {
                return None;
            }
            if let PathArguments::AngleBracketed(args) = &segment.arguments {
                if args.args.len() >= 2 {
                    if let (GenericArgument::Type(key), GenericArgument::Type(value)) =
                        (&args.args[0], &args.args[1])
                    {
                        return Some((key.clone(), value.clone()));
                    }
                }
            }
        }
    }
    None
}

fn scalar_kind(ty: &Type) -> Option<Scalar> {
    if let Type::Path(TypePath { path, .. }) = ty {
        if let Some(segment) = path.segments.last() {
            return match segment.ident.to_string().as_str() {
                "String" | "str" => Some(Scalar::Str),
                "bool" => Some(Scalar::Bool),
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32"
                | "u64" | "u128" | "usize" | "f32" | "f64" => Some(Scalar::Number),
                _ => None,
            };
        }
    }
    None
}
