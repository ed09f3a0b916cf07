use syn::meta::ParseNestedMeta;
use syn::Attribute;
use syn::Error;
use syn::Expr;
use syn::LitInt;
use syn::LitStr;
use syn::Result;

/// `#[validate(...)]` on a struct or enum
#[derive(Default)]
pub struct ContainerAttrs {
    pub type_name: Option<LitStr>,
}

/// `#[validate(...)]` on a struct field or union variant
#[derive(Default)]
pub struct FieldRules {
    pub name: Option<LitStr>,
    pub skip: bool,
    pub required: bool,
    pub oneof: bool,
    pub min_len: Option<LitInt>,
    pub max_len: Option<LitInt>,
    pub pattern: Option<LitStr>,
    pub range: Option<RangeRule>,
    pub min_items: Option<LitInt>,
    pub max_items: Option<LitInt>,
    pub min_pairs: Option<LitInt>,
    pub max_pairs: Option<LitInt>,
    pub key_min_len: Option<LitInt>,
    pub key_max_len: Option<LitInt>,
}

#[derive(Default)]
pub struct RangeRule {
    pub gt: Option<Expr>,
    pub gte: Option<Expr>,
    pub lt: Option<Expr>,
    pub lte: Option<Expr>,
}

impl FieldRules {
    /// Names of the rules (other than `name`) present on this field.
    pub fn declared(&self) -> Vec<&'static str> {
        let mut declared = Vec::new();
        if self.skip {
            declared.push("skip");
        }
        if self.required {
            declared.push("required");
        }
        if self.oneof {
            declared.push("oneof");
        }
        if self.min_len.is_some() {
            declared.push("min_len");
        }
        if self.max_len.is_some() {
            declared.push("max_len");
        }
        if self.pattern.is_some() {
            declared.push("pattern");
        }
        if self.range.is_some() {
            declared.push("range");
        }
        if self.min_items.is_some() {
            declared.push("min_items");
        }
        if self.max_items.is_some() {
            declared.push("max_items");
        }
        if self.min_pairs.is_some() {
            declared.push("min_pairs");
        }
        if self.max_pairs.is_some() {
            declared.push("max_pairs");
        }
        if self.key_min_len.is_some() || self.key_max_len.is_some() {
            declared.push("keys");
        }
        declared
    }
}

fn set<T>(slot: &mut Option<T>, value: T, meta: &ParseNestedMeta) -> Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate validate rule"));
    }
    *slot = Some(value);
    Ok(())
}

fn set_flag(flag: &mut bool, meta: &ParseNestedMeta) -> Result<()> {
    if *flag {
        return Err(meta.error("duplicate validate rule"));
    }
    *flag = true;
    Ok(())
}

pub fn parse_container(attrs: &[Attribute]) -> Result<ContainerAttrs> {
    let mut container = ContainerAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("type_name") {
                let value: LitStr = meta.value()?.parse()?;
                set(&mut container.type_name, value, &meta)
            } else {
                Err(meta.error("expected `type_name`"))
            }
        })?;
    }

    Ok(container)
}

pub fn parse_field(attrs: &[Attribute]) -> Result<FieldRules> {
    let mut rules = FieldRules::default();

    for attr in attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let path = &meta.path;
            if path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                set(&mut rules.name, value, &meta)
            } else if path.is_ident("skip") {
                set_flag(&mut rules.skip, &meta)
            } else if path.is_ident("required") {
                set_flag(&mut rules.required, &meta)
            } else if path.is_ident("oneof") {
                set_flag(&mut rules.oneof, &meta)
            } else if path.is_ident("min_len") {
                let value: LitInt = meta.value()?.parse()?;
                set(&mut rules.min_len, value, &meta)
            } else if path.is_ident("max_len") {
                let value: LitInt = meta.value()?.parse()?;
                set(&mut rules.max_len, value, &meta)
            } else if path.is_ident("pattern") {
                let value: LitStr = meta.value()?.parse()?;
                // Malformed patterns fail the build
                if let Err(e) = regex::Regex::new(&value.value()) {
                    return Err(Error::new(value.span(), format!("invalid pattern: {}", e)));
                }
                set(&mut rules.pattern, value, &meta)
            } else if path.is_ident("range") {
                let range = parse_range(&meta)?;
                set(&mut rules.range, range, &meta)
            } else if path.is_ident("min_items") {
                let value: LitInt = meta.value()?.parse()?;
                set(&mut rules.min_items, value, &meta)
            } else if path.is_ident("max_items") {
                let value: LitInt = meta.value()?.parse()?;
                set(&mut rules.max_items, value, &meta)
            } else if path.is_ident("min_pairs") {
                let value: LitInt = meta.value()?.parse()?;
                set(&mut rules.min_pairs, value, &meta)
            } else if path.is_ident("max_pairs") {
                let value: LitInt = meta.value()?.parse()?;
                set(&mut rules.max_pairs, value, &meta)
            } else if path.is_ident("keys") {
                meta.parse_nested_meta(|inner| {
                    if inner.path.is_ident("min_len") {
                        let value: LitInt = inner.value()?.parse()?;
                        set(&mut rules.key_min_len, value, &inner)
                    } else if inner.path.is_ident("max_len") {
                        let value: LitInt = inner.value()?.parse()?;
                        set(&mut rules.key_max_len, value, &inner)
                    } else {
                        Err(inner.error("expected `min_len` or `max_len`"))
                    }
                })
            } else {
                Err(meta.error("unsupported validate rule"))
            }
        })?;
    }

    Ok(rules)
}

fn parse_range(meta: &ParseNestedMeta) -> Result<RangeRule> {
    let mut range = RangeRule::default();

    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("gt") {
            let value: Expr = inner.value()?.parse()?;
            set(&mut range.gt, value, &inner)
        } else if inner.path.is_ident("gte") {
            let value: Expr = inner.value()?.parse()?;
            set(&mut range.gte, value, &inner)
        } else if inner.path.is_ident("lt") {
            let value: Expr = inner.value()?.parse()?;
            set(&mut range.lt, value, &inner)
        } else if inner.path.is_ident("lte") {
            let value: Expr = inner.value()?.parse()?;
            set(&mut range.lte, value, &inner)
        } else {
            Err(inner.error("expected `gt`, `gte`, `lt` or `lte`"))
        }
    })?;

    if range.gt.is_some() && range.gte.is_some() {
        return Err(meta.error("`gt` and `gte` are mutually exclusive"));
    }
    if range.lt.is_some() && range.lte.is_some() {
        return Err(meta.error("`lt` and `lte` are mutually exclusive"));
    }
    if range.gt.is_none() && range.gte.is_none() && range.lt.is_none() && range.lte.is_none() {
        return Err(meta.error("range needs at least one bound"));
    }

    Ok(range)
}
