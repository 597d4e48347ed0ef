use ddgen_core::ir::FieldType;
use serde_json::Value;

/// Map a `FieldType` to the TypeScript type used when destructuring inputs.
pub fn field_type_to_ts(field_type: &FieldType) -> String {
    match field_type {
        FieldType::String { enum_values } if !enum_values.is_empty() => enum_values
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(" | "),
        FieldType::String { .. } => "string".to_string(),
        FieldType::Number { .. } => "number".to_string(),
        FieldType::Boolean => "boolean".to_string(),
        FieldType::Array { items, .. } => {
            let inner = field_type_to_ts(items);
            if inner.contains('|') {
                format!("({inner})[]")
            } else {
                format!("{inner}[]")
            }
        }
        FieldType::Map { values } => format!("Record<string, {}>", field_type_to_ts(values)),
        FieldType::Object { properties, .. } if properties.is_empty() => {
            "Record<string, unknown>".to_string()
        }
        FieldType::Object {
            properties,
            required,
        } => {
            let fields: Vec<String> = properties
                .iter()
                .map(|(name, ty)| {
                    let key = property_key(name);
                    let ts = field_type_to_ts(ty);
                    if required.contains(name) {
                        format!("{key}: {ts}")
                    } else {
                        format!("{key}?: {ts}")
                    }
                })
                .collect();
            format!("{{ {} }}", fields.join("; "))
        }
    }
}

/// Property key, quoted unless it is a plain identifier.
pub fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let is_ident = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_ident {
        name.to_string()
    } else {
        js_string(name.to_string())
    }
}

/// Pretty-printed JSON whose continuation lines are shifted right by
/// `indent` spaces, for embedding at that depth in generated source.
pub fn json_literal(value: &Value, indent: usize) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    let pad = " ".repeat(indent);
    pretty
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Double-quoted JavaScript string literal.
pub fn js_string(value: String) -> String {
    Value::String(value).to_string()
}

/// Text safe inside a JavaScript template literal.
pub fn template_text(value: String) -> String {
    value
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace('$', "\\$")
        .replace('\n', " ")
        .trim()
        .to_string()
}
