//! Generic recursive structural checker for JSON payloads.
//!
//! A [`Schema`] describes the shape of a value: required/optional fields, value
//! types, length and range limits, enumerations. [`Schema::check`] walks the
//! value and pushes one message per offending field, so a caller always sees
//! every problem at once.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String {
        min_len: usize,
        max_len: Option<usize>,
        one_of: Option<&'static [&'static str]>,
        prefix: Option<&'static str>,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    Array {
        items: Box<Schema>,
        min_items: usize,
        max_items: Option<usize>,
    },
    Object {
        fields: Vec<Field>,
        allow_unknown: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub schema: Schema,
    pub required: bool,
}

impl Field {
    pub fn required(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            schema,
            required: true,
        }
    }

    pub fn optional(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            schema,
            required: false,
        }
    }
}

impl Schema {
    pub fn string(min_len: usize, max_len: usize) -> Self {
        Schema::String {
            min_len,
            max_len: Some(max_len),
            one_of: None,
            prefix: None,
        }
    }

    pub fn one_of(values: &'static [&'static str]) -> Self {
        Schema::String {
            min_len: 0,
            max_len: None,
            one_of: Some(values),
            prefix: None,
        }
    }

    pub fn prefixed(prefix: &'static str, min_len: usize, max_len: usize) -> Self {
        Schema::String {
            min_len,
            max_len: Some(max_len),
            one_of: None,
            prefix: Some(prefix),
        }
    }

    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        Schema::Integer { min, max }
    }

    pub fn array(items: Schema, min_items: usize, max_items: usize) -> Self {
        Schema::Array {
            items: Box::new(items),
            min_items,
            max_items: Some(max_items),
        }
    }

    /// Object that tolerates fields it does not describe.
    pub fn object(fields: Vec<Field>) -> Self {
        Schema::Object {
            fields,
            allow_unknown: true,
        }
    }

    /// Object that rejects fields it does not describe.
    pub fn strict_object(fields: Vec<Field>) -> Self {
        Schema::Object {
            fields,
            allow_unknown: false,
        }
    }

    /// Check `value` against this schema, appending every violation to `errors`.
    pub fn check(&self, value: &Value, path: &str, errors: &mut Vec<String>) {
        match self {
            Schema::String {
                min_len,
                max_len,
                one_of,
                prefix,
            } => {
                let Some(s) = value.as_str() else {
                    errors.push(format!("{path}: expected string"));
                    return;
                };
                if let Some(allowed) = one_of {
                    if !allowed.contains(&s) {
                        errors.push(format!("{path}: must be one of {}", allowed.join(", ")));
                    }
                    return;
                }
                let len = s.chars().count();
                if len < *min_len {
                    errors.push(format!("{path}: must be at least {min_len} characters"));
                }
                if let Some(max) = max_len {
                    if len > *max {
                        errors.push(format!("{path}: must be at most {max} characters"));
                    }
                }
                if let Some(prefix) = prefix {
                    if !s.starts_with(prefix) {
                        errors.push(format!("{path}: must start with '{prefix}'"));
                    }
                }
            }
            Schema::Integer { min, max } => {
                let Some(n) = value.as_i64() else {
                    errors.push(format!("{path}: expected integer"));
                    return;
                };
                if let Some(min) = min.filter(|min| n < *min) {
                    errors.push(format!("{path}: must be >= {min}"));
                }
                if let Some(max) = max.filter(|max| n > *max) {
                    errors.push(format!("{path}: must be <= {max}"));
                }
            }
            Schema::Number { min, max } => {
                let Some(n) = value.as_f64() else {
                    errors.push(format!("{path}: expected number"));
                    return;
                };
                if let Some(min) = min.filter(|min| n < *min) {
                    errors.push(format!("{path}: must be >= {min}"));
                }
                if let Some(max) = max.filter(|max| n > *max) {
                    errors.push(format!("{path}: must be <= {max}"));
                }
            }
            Schema::Boolean => {
                if !value.is_boolean() {
                    errors.push(format!("{path}: expected boolean"));
                }
            }
            Schema::Array {
                items,
                min_items,
                max_items,
            } => {
                let Some(values) = value.as_array() else {
                    errors.push(format!("{path}: expected array"));
                    return;
                };
                if values.len() < *min_items {
                    errors.push(format!("{path}: must contain at least {min_items} items"));
                }
                if let Some(max) = max_items {
                    if values.len() > *max {
                        errors.push(format!("{path}: must contain at most {max} items"));
                    }
                }
                for (idx, item) in values.iter().enumerate() {
                    items.check(item, &format!("{path}[{idx}]"), errors);
                }
            }
            Schema::Object {
                fields,
                allow_unknown,
            } => {
                let Some(map) = value.as_object() else {
                    errors.push(format!("{path}: expected object"));
                    return;
                };
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match map.get(field.name) {
                        None | Some(Value::Null) => {
                            if field.required {
                                errors.push(format!("{field_path}: is required"));
                            }
                        }
                        Some(v) => field.schema.check(v, &field_path, errors),
                    }
                }
                if !allow_unknown {
                    for key in map.keys() {
                        if !fields.iter().any(|f| f.name == key.as_str()) {
                            errors.push(format!("{path}.{key}: unknown field"));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(schema: &Schema, value: Value) -> Vec<String> {
        let mut errors = Vec::new();
        schema.check(&value, "content", &mut errors);
        errors
    }

    #[test]
    fn collects_every_field_error() {
        let schema = Schema::object(vec![
            Field::required("title", Schema::string(1, 10)),
            Field::required("level", Schema::integer(Some(1), Some(6))),
            Field::optional("caption", Schema::string(0, 5)),
        ]);
        let errors = run(&schema, json!({ "level": 9, "caption": "too long" }));
        assert_eq!(
            errors,
            vec![
                "content.title: is required",
                "content.level: must be <= 6",
                "content.caption: must be at most 5 characters",
            ]
        );
    }

    #[test]
    fn recurses_into_arrays_of_objects() {
        let schema = Schema::object(vec![Field::required(
            "entries",
            Schema::array(
                Schema::object(vec![Field::required("title", Schema::string(1, 50))]),
                1,
                3,
            ),
        )]);
        let errors = run(&schema, json!({ "entries": [{ "title": "ok" }, { "title": 4 }, {}] }));
        assert_eq!(
            errors,
            vec![
                "content.entries[1].title: expected string",
                "content.entries[2].title: is required",
            ]
        );
    }

    #[test]
    fn strict_objects_reject_unknown_fields() {
        let schema = Schema::strict_object(vec![Field::optional(
            "alignment",
            Schema::one_of(&["left", "right"]),
        )]);
        let errors = run(&schema, json!({ "alignment": "middle", "blink": true }));
        assert_eq!(
            errors,
            vec![
                "content.alignment: must be one of left, right",
                "content.blink: unknown field",
            ]
        );
    }

    #[test]
    fn type_mismatches_are_reported_not_panicked() {
        assert_eq!(run(&Schema::Boolean, json!("yes")), vec!["content: expected boolean"]);
        assert_eq!(
            run(&Schema::integer(None, None), json!(1.5)),
            vec!["content: expected integer"]
        );
        assert_eq!(
            run(&Schema::object(vec![]), json!([1])),
            vec!["content: expected object"]
        );
    }

    #[test]
    fn null_optional_field_is_absent() {
        let schema = Schema::object(vec![Field::optional("alt", Schema::string(1, 10))]);
        assert!(run(&schema, json!({ "alt": null })).is_empty());
    }
}
