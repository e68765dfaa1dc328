//! Human readable rendering of a contract

use std::fmt::Write;

use barrister_idl::{Contract, Field, SchemaElement, UnresolvedType};

/// IDL spelling of a field type, e.g. `[]string [optional]`
pub fn type_label(field: &Field) -> String {
    let mut label = String::new();
    if field.is_array {
        label.push_str("[]");
    }
    label.push_str(&field.type_name);
    if field.optional {
        label.push_str(" [optional]");
    }
    label
}

/// One line per declared item, in document order
pub fn render(contract: &Contract) -> String {
    let mut out = String::new();

    if let Some(meta) = contract.meta() {
        let generated = meta
            .generated_at()
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());
        let _ = writeln!(
            out,
            "barrister {} generated {} checksum {}",
            meta.barrister_version, generated, meta.checksum
        );
    }

    for element in contract.elements() {
        match element {
            SchemaElement::Enum(def) => {
                let values: Vec<&str> = def.values.iter().map(|v| v.value.as_str()).collect();
                let _ = writeln!(out, "enum {} {{ {} }}", def.name, values.join(", "));
            }
            SchemaElement::Struct(def) => {
                match &def.extends {
                    Some(parent) => {
                        let _ = writeln!(out, "struct {} extends {}", def.name, parent);
                    }
                    None => {
                        let _ = writeln!(out, "struct {}", def.name);
                    }
                }
                if let Some(resolved) = contract.struct_def(&def.name) {
                    for (name, field) in resolved.resolved_fields() {
                        let _ = writeln!(out, "    {} {}", name, type_label(field));
                    }
                }
            }
            SchemaElement::Interface(iface) => {
                let _ = writeln!(out, "interface {}", iface.name);
                for function in &iface.functions {
                    let params: Vec<String> = function
                        .params
                        .iter()
                        .map(|p| format!("{} {}", p.name, type_label(p)))
                        .collect();
                    let _ = writeln!(
                        out,
                        "    {}({}) {}",
                        function.name,
                        params.join(", "),
                        type_label(&function.returns)
                    );
                }
            }
            SchemaElement::Comment(_) | SchemaElement::Meta(_) => {}
        }
    }

    out
}

pub fn render_unresolved(unresolved: &[UnresolvedType]) -> String {
    let mut out = String::new();
    for item in unresolved {
        let _ = writeln!(out, "unknown type '{}' at {}", item.type_name, item.location);
    }
    out
}
