//! Implementation of #[derive(IdlType)] macro

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DataEnum, DeriveInput, Fields, FieldsNamed, Result};

use crate::utils::{ContainerMeta, extract_container_meta, extract_member_meta};

pub fn derive_idl_type_impl(input: DeriveInput) -> Result<TokenStream> {
    let ident = &input.ident;
    let container = extract_container_meta(&input.attrs)?;
    let idl_name = container
        .name
        .clone()
        .unwrap_or_else(|| ident.to_string());

    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => struct_repr(&idl_name, fields, &container)?,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "IdlType can only be derived for structs with named fields",
                ));
            }
        },
        Data::Enum(data) => enum_repr(&idl_name, data, &container)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input,
                "IdlType cannot be derived for unions",
            ));
        }
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::barrister_server::IdlType for #ident #ty_generics #where_clause {
            fn repr() -> ::barrister_server::TypeRepr {
                #body
            }
        }
    })
}

fn struct_repr(
    idl_name: &str,
    fields: &FieldsNamed,
    container: &ContainerMeta,
) -> Result<TokenStream> {
    let mut entries = Vec::new();

    for field in &fields.named {
        let member = extract_member_meta(&field.attrs)?;
        if member.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let raw = ident.to_string();
        let raw = raw.strip_prefix("r#").unwrap_or(&raw);
        let wire_name = member.rename.unwrap_or_else(|| match container.rename_all {
            Some(rule) => rule.apply_to_field(raw),
            None => raw.to_string(),
        });
        let ty = &field.ty;

        entries.push(quote! {
            (
                #wire_name.to_string(),
                <#ty as ::barrister_server::IdlType>::repr(),
            )
        });
    }

    Ok(quote! {
        ::barrister_server::TypeRepr::recursive_structure(#idl_name, || vec![#(#entries),*])
    })
}

fn enum_repr(idl_name: &str, data: &DataEnum, container: &ContainerMeta) -> Result<TokenStream> {
    let mut values = Vec::new();

    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "IdlType enums must only have unit variants",
            ));
        }
        let member = extract_member_meta(&variant.attrs)?;
        if member.skip {
            continue;
        }
        let raw = variant.ident.to_string();
        let wire_value = member.rename.unwrap_or_else(|| match container.rename_all {
            Some(rule) => rule.apply_to_variant(&raw),
            None => raw.clone(),
        });
        values.push(wire_value);
    }

    Ok(quote! {
        ::barrister_server::TypeRepr::Enum {
            name: #idl_name.to_string(),
            values: vec![#(#values.to_string()),*],
        }
    })
}
