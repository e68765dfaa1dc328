//! Attribute parsing shared by the derive implementation

use syn::{Attribute, LitStr, Result};

/// Container-level naming read from `#[idl(...)]` and `#[serde(...)]`
#[derive(Debug, Default)]
pub struct ContainerMeta {
    /// `#[idl(name = "...")]`, falling back to `#[serde(rename = "...")]`
    pub name: Option<String>,
    pub rename_all: Option<RenameRule>,
}

/// Member-level naming read from `#[serde(...)]`
#[derive(Debug, Default)]
pub struct MemberMeta {
    pub rename: Option<String>,
    pub skip: bool,
}

/// The subset of serde's `rename_all` rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
}

impl RenameRule {
    pub fn from_rule(rule: &str) -> Option<Self> {
        match rule {
            "lowercase" => Some(RenameRule::Lower),
            "UPPERCASE" => Some(RenameRule::Upper),
            "PascalCase" => Some(RenameRule::Pascal),
            "camelCase" => Some(RenameRule::Camel),
            "snake_case" => Some(RenameRule::Snake),
            "SCREAMING_SNAKE_CASE" => Some(RenameRule::ScreamingSnake),
            "kebab-case" => Some(RenameRule::Kebab),
            _ => None,
        }
    }

    /// Apply to a snake_case field identifier
    pub fn apply_to_field(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => pascal_case(field),
            RenameRule::Camel => {
                let pascal = pascal_case(field);
                lower_first(&pascal)
            }
            RenameRule::Kebab => field.replace('_', "-"),
        }
    }

    /// Apply to a PascalCase variant identifier
    pub fn apply_to_variant(self, variant: &str) -> String {
        match self {
            RenameRule::Pascal => variant.to_string(),
            RenameRule::Lower => variant.to_ascii_lowercase(),
            RenameRule::Upper => variant.to_ascii_uppercase(),
            RenameRule::Camel => lower_first(variant),
            RenameRule::Snake => snake_case(variant),
            RenameRule::ScreamingSnake => snake_case(variant).to_ascii_uppercase(),
            RenameRule::Kebab => snake_case(variant).replace('_', "-"),
        }
    }
}

fn pascal_case(snake: &str) -> String {
    snake
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

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn snake_case(pascal: &str) -> String {
    let mut out = String::with_capacity(pascal.len() + 4);
    for (i, ch) in pascal.char_indices() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn extract_container_meta(attrs: &[Attribute]) -> Result<ContainerMeta> {
    let mut meta = ContainerMeta::default();
    let mut idl_name = None;
    let mut serde_name = None;

    for attr in attrs {
        if attr.path().is_ident("idl") {
            attr.parse_nested_meta(|nested| {
                if nested.path.is_ident("name") {
                    let s: LitStr = nested.value()?.parse()?;
                    idl_name = Some(s.value());
                    Ok(())
                } else {
                    Err(nested.error("unsupported idl attribute, expected `name`"))
                }
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|nested| {
                if nested.path.is_ident("rename") {
                    let s: LitStr = nested.value()?.parse()?;
                    serde_name = Some(s.value());
                } else if nested.path.is_ident("rename_all") {
                    let s: LitStr = nested.value()?.parse()?;
                    meta.rename_all = Some(RenameRule::from_rule(&s.value()).ok_or_else(|| {
                        syn::Error::new_spanned(&s, "unsupported rename_all rule")
                    })?);
                } else if nested.input.peek(syn::Token![=]) {
                    // Other serde options do not affect naming
                    let _: syn::Expr = nested.value()?.parse()?;
                } else if !nested.input.is_empty() && !nested.input.peek(syn::Token![,]) {
                    nested.parse_nested_meta(|_| Ok(()))?;
                }
                Ok(())
            })?;
        }
    }

    meta.name = idl_name.or(serde_name);
    Ok(meta)
}

pub fn extract_member_meta(attrs: &[Attribute]) -> Result<MemberMeta> {
    let mut meta = MemberMeta::default();

    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("rename") {
                let s: LitStr = nested.value()?.parse()?;
                meta.rename = Some(s.value());
            } else if nested.path.is_ident("skip") {
                meta.skip = true;
            } else if nested.input.peek(syn::Token![=]) {
                let _: syn::Expr = nested.value()?.parse()?;
            } else if !nested.input.is_empty() && !nested.input.peek(syn::Token![,]) {
                nested.parse_nested_meta(|_| Ok(()))?;
            }
            Ok(())
        })?;
    }

    Ok(meta)
}
