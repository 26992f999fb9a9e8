//! Renders `jsonschema` error kinds into the issue message catalog.
//!
//! The catalog (`must be > 0/1 but found 0`, `missing properties: "x"`, ...)
//! is what classification rules match against, so it is pinned here rather
//! than taken from the crate's `Display` output.

use jsonschema::error::{TypeKind, ValidationErrorKind};
use serde_json::{Number, Value};

/// Message for one failing keyword. `instance` is the value the keyword was
/// applied to.
pub(super) fn render(kind: &ValidationErrorKind, instance: &Value) -> String {
    match kind {
        ValidationErrorKind::AdditionalItems { limit } => format!(
            "only {limit} items are allowed, but found {} items",
            array_len(instance)
        ),
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("additionalProperties {} not allowed", quote_all(unexpected))
        }
        ValidationErrorKind::UnevaluatedProperties { unexpected } => {
            format!("unevaluatedProperties {} not allowed", quote_all(unexpected))
        }
        ValidationErrorKind::UnevaluatedItems { unexpected } => {
            format!("unevaluatedItems {} not allowed", unexpected.join(", "))
        }
        ValidationErrorKind::AnyOf => "anyOf failed".to_string(),
        ValidationErrorKind::OneOfNotValid => "oneOf failed".to_string(),
        ValidationErrorKind::OneOfMultipleValid => {
            "valid against more than one oneOf schema".to_string()
        }
        ValidationErrorKind::Not { .. } => "not failed".to_string(),
        ValidationErrorKind::Contains => "contains failed".to_string(),
        ValidationErrorKind::FalseSchema => "always fail".to_string(),
        ValidationErrorKind::UniqueItems => "items must be unique".to_string(),
        ValidationErrorKind::Constant { expected_value } => match expected_value {
            Value::Object(_) | Value::Array(_) => "const failed".to_string(),
            scalar => format!("value must be {}", literal(scalar)),
        },
        ValidationErrorKind::Enum { options } => match options.as_array().map(Vec::as_slice) {
            Some([single]) => format!("value must be {}", literal(single)),
            Some(many) => format!(
                "value must be one of {}",
                many.iter().map(literal).collect::<Vec<_>>().join(", ")
            ),
            None => format!("value must be one of {}", literal(options)),
        },
        ValidationErrorKind::Type { kind } => {
            let expected = match kind {
                TypeKind::Single(single) => single.to_string(),
                TypeKind::Multiple(types) => (*types)
                    .into_iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" or "),
            };
            format!("expected {expected}, but got {}", json_type(instance))
        }
        ValidationErrorKind::Required { property } => {
            format!("missing properties: {}", literal(property))
        }
        ValidationErrorKind::Pattern { pattern } => {
            format!("does not match pattern {}", quote(pattern))
        }
        ValidationErrorKind::Format { format } => {
            format!("{} is not valid {}", literal(instance), quote(format))
        }
        ValidationErrorKind::MinLength { limit } => {
            format!("length must be >= {limit}, but got {}", string_len(instance))
        }
        ValidationErrorKind::MaxLength { limit } => {
            format!("length must be <= {limit}, but got {}", string_len(instance))
        }
        ValidationErrorKind::MinItems { limit } => format!(
            "minimum {limit} items allowed, but found {} items",
            array_len(instance)
        ),
        ValidationErrorKind::MaxItems { limit } => format!(
            "maximum {limit} items allowed, but found {} items",
            array_len(instance)
        ),
        ValidationErrorKind::MinProperties { limit } => format!(
            "minimum {limit} properties allowed, but found {} properties",
            object_len(instance)
        ),
        ValidationErrorKind::MaxProperties { limit } => format!(
            "maximum {limit} properties allowed, but found {} properties",
            object_len(instance)
        ),
        ValidationErrorKind::Minimum { limit } => bound(">=", limit, instance),
        ValidationErrorKind::Maximum { limit } => bound("<=", limit, instance),
        ValidationErrorKind::ExclusiveMinimum { limit } => bound(">", limit, instance),
        ValidationErrorKind::ExclusiveMaximum { limit } => bound("<", limit, instance),
        ValidationErrorKind::MultipleOf { multiple_of } => {
            let limit = Number::from_f64(*multiple_of)
                .map(|n| rational(&n))
                .unwrap_or_else(|| multiple_of.to_string());
            format!("{} not multipleOf {limit}", literal(instance))
        }
        ValidationErrorKind::PropertyNames { error } => {
            format!("invalid propertyName {}", literal(&error.instance))
        }
        ValidationErrorKind::ContentEncoding { content_encoding } => {
            format!("value is not {} encoded", quote(content_encoding))
        }
        ValidationErrorKind::ContentMediaType { content_media_type } => {
            format!("value is not of mediatype {}", quote(content_media_type))
        }
        ValidationErrorKind::FromUtf8 { error } => format!("invalid utf-8: {error}"),
        ValidationErrorKind::BacktrackLimitExceeded { error } => {
            format!("pattern evaluation aborted: {error}")
        }
        ValidationErrorKind::Custom { message } => message.clone(),
        ValidationErrorKind::Referencing(error) => format!("unresolved reference: {error}"),
    }
}

fn bound(op: &str, limit: &Value, instance: &Value) -> String {
    let limit = match limit {
        Value::Number(n) => rational(n),
        other => literal(other),
    };
    format!("must be {op} {limit} but found {}", literal(instance))
}

/// JSON type name of an instance as it appears in `expected X, but got Y`.
/// Integers and floats are both `number`.
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn string_len(value: &Value) -> usize {
    value.as_str().map_or(0, |s| s.chars().count())
}

fn array_len(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}

fn object_len(value: &Value) -> usize {
    value.as_object().map_or(0, serde_json::Map::len)
}

/// Double-quoted, escaped string.
pub(super) fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

fn quote_all(items: &[String]) -> String {
    items.iter().map(|s| quote(s)).collect::<Vec<_>>().join(", ")
}

/// Compact JSON rendering of a value.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        other => serde_json::to_string(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Numeric limit rendered as a reduced fraction: `0` → `0/1`, `0.5` → `1/2`.
fn rational(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return format!("{i}/1");
    }
    if let Some(u) = n.as_u64() {
        return format!("{u}/1");
    }
    let text = n.to_string();
    decimal_to_fraction(&text).unwrap_or(text)
}

fn decimal_to_fraction(text: &str) -> Option<String> {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (mantissa, exponent) = match digits.find(|c| c == 'e' || c == 'E') {
        Some(pos) => (&digits[..pos], digits[pos + 1..].parse::<i32>().ok()?),
        None => (digits, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mut numerator: i128 = format!("{int_part}{frac_part}").parse().ok()?;
    let scale = i32::try_from(frac_part.len()).ok()? - exponent;
    let denominator: i128 = if scale >= 0 {
        10i128.checked_pow(scale.unsigned_abs())?
    } else {
        numerator = numerator.checked_mul(10i128.checked_pow(scale.unsigned_abs())?)?;
        1
    };

    let divisor = gcd(numerator, denominator);
    Some(format!("{sign}{}/{}", numerator / divisor, denominator / divisor))
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rational_integers() {
        assert_eq!(rational(&Number::from(0)), "0/1");
        assert_eq!(rational(&Number::from(100)), "100/1");
        assert_eq!(rational(&Number::from(-3)), "-3/1");
    }

    #[test]
    fn test_rational_decimals_are_reduced() {
        let half = Number::from_f64(0.5).unwrap();
        assert_eq!(rational(&half), "1/2");
        let negative = Number::from_f64(-2.5).unwrap();
        assert_eq!(rational(&negative), "-5/2");
        let whole = Number::from_f64(3.0).unwrap();
        assert_eq!(rational(&whole), "3/1");
    }

    #[test]
    fn test_decimal_with_exponent() {
        assert_eq!(decimal_to_fraction("1e-7").as_deref(), Some("1/10000000"));
        assert_eq!(decimal_to_fraction("2.5e2").as_deref(), Some("250/1"));
    }

    #[test]
    fn test_enum_messages() {
        let one = ValidationErrorKind::Enum { options: json!(["ios"]) };
        assert_eq!(render(&one, &json!("x")), r#"value must be "ios""#);
        let many = ValidationErrorKind::Enum { options: json!(["ios", "macos", 3]) };
        assert_eq!(render(&many, &json!("x")), r#"value must be one of "ios", "macos", 3"#);
    }

    #[test]
    fn test_const_messages() {
        let scalar = ValidationErrorKind::Constant { expected_value: json!(true) };
        assert_eq!(render(&scalar, &json!(false)), "value must be true");
        let composite = ValidationErrorKind::Constant { expected_value: json!({"a": 1}) };
        assert_eq!(render(&composite, &json!({})), "const failed");
    }

    #[test]
    fn test_bounds_render_limits_as_fractions() {
        let kind = ValidationErrorKind::ExclusiveMinimum { limit: json!(0) };
        assert_eq!(render(&kind, &json!(0)), "must be > 0/1 but found 0");
        let kind = ValidationErrorKind::Maximum { limit: json!(2.5) };
        assert_eq!(render(&kind, &json!(3)), "must be <= 5/2 but found 3");
        let kind = ValidationErrorKind::MultipleOf { multiple_of: 0.5 };
        assert_eq!(render(&kind, &json!(0.3)), "0.3 not multipleOf 1/2");
    }

    #[test]
    fn test_length_counts_characters() {
        let kind = ValidationErrorKind::MaxLength { limit: 2 };
        assert_eq!(render(&kind, &json!("äöü")), "length must be <= 2, but got 3");
    }

    #[test]
    fn test_counting_messages() {
        let kind = ValidationErrorKind::MinItems { limit: 2 };
        assert_eq!(render(&kind, &json!([])), "minimum 2 items allowed, but found 0 items");
        let kind = ValidationErrorKind::MaxProperties { limit: 1 };
        assert_eq!(
            render(&kind, &json!({"a": 1, "b": 2})),
            "maximum 1 properties allowed, but found 2 properties"
        );
        let kind = ValidationErrorKind::AdditionalItems { limit: 1 };
        assert_eq!(
            render(&kind, &json!([1, 2, 3])),
            "only 1 items are allowed, but found 3 items"
        );
    }

    #[test]
    fn test_additional_properties_are_quoted_in_order() {
        let kind = ValidationErrorKind::AdditionalProperties {
            unexpected: vec!["b".to_string(), "a".to_string()],
        };
        assert_eq!(render(&kind, &json!({})), r#"additionalProperties "b", "a" not allowed"#);
    }

    #[test]
    fn test_pattern_and_format() {
        let kind = ValidationErrorKind::Pattern { pattern: r"^\d+$".to_string() };
        assert_eq!(render(&kind, &json!("x")), r#"does not match pattern "^\\d+$""#);
        let kind = ValidationErrorKind::Format { format: "email".to_string() };
        assert_eq!(render(&kind, &json!("nope")), r#""nope" is not valid "email""#);
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type(&json!(null)), "null");
        assert_eq!(json_type(&json!(2)), "number");
        assert_eq!(json_type(&json!(2.5)), "number");
        assert_eq!(json_type(&json!(false)), "boolean");
        assert_eq!(json_type(&json!([])), "array");
    }
}
