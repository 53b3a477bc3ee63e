//! Built-in validators for the six attribute types
//!
//! Each validator checks length, character, and format rules for its type and
//! reports the normalized form to store. The order-index presence rule is
//! enforced by every validator: forbidden everywhere except `ordered_tag`,
//! where it is required and must be non-negative.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use url::Url;

use super::{AttributeType, AttributeValidator, ValidationResult};

pub const MAX_TAG_LENGTH: usize = 50;
pub const MAX_STRING_LENGTH: usize = 500;
pub const MAX_MARKDOWN_LENGTH: usize = 10_000;
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

const TAG_FORBIDDEN_CHARS: [char; 5] = [',', ';', '|', '\n', '\t'];

const DATA_IMAGE_PREFIX: &str = "data:image/";
const BASE64_SEPARATOR: &str = ";base64,";
const SUPPORTED_IMAGE_TYPES: [&str; 4] = [
    "data:image/jpeg",
    "data:image/png",
    "data:image/gif",
    "data:image/webp",
];

fn check_length(value: &str, max_length: usize) -> Result<(), String> {
    if value.is_empty() {
        return Err("value cannot be empty".to_string());
    }
    if value.len() > max_length {
        return Err(format!(
            "value exceeds maximum length of {max_length} characters"
        ));
    }
    Ok(())
}

fn check_forbidden_chars(value: &str) -> Result<(), String> {
    for c in TAG_FORBIDDEN_CHARS {
        if value.contains(c) {
            return Err(format!("value contains forbidden character: {c:?}"));
        }
    }
    Ok(())
}

fn check_no_order_index(order_index: Option<i64>, type_name: &str) -> Result<(), String> {
    if order_index.is_some() {
        return Err(format!("order_index not allowed for {type_name} type"));
    }
    Ok(())
}

/// Lowercase + trim, used by the case-insensitive tag types.
fn normalize_case(value: &str) -> String {
    value.trim().to_lowercase()
}

fn check_result(check: Result<(), String>) -> Option<ValidationResult> {
    check.err().map(ValidationResult::invalid)
}

/// Unordered tag values: short, lowercase-normalized, no separators.
pub struct TagValidator;

impl AttributeValidator for TagValidator {
    fn validate(&self, value: &str, order_index: Option<i64>) -> ValidationResult {
        if let Some(invalid) = check_result(check_length(value, MAX_TAG_LENGTH)) {
            return invalid;
        }
        if let Some(invalid) = check_result(check_forbidden_chars(value)) {
            return invalid;
        }
        if let Some(invalid) = check_result(check_no_order_index(order_index, "tag")) {
            return invalid;
        }

        let normalized = normalize_case(value);
        if normalized.is_empty() {
            return ValidationResult::invalid("value cannot be empty");
        }
        ValidationResult::valid(normalized)
    }

    fn attribute_type(&self) -> AttributeType {
        AttributeType::Tag
    }

    fn description(&self) -> &'static str {
        "Unordered tag. Lowercased on storage; duplicate values are rejected per owner."
    }
}

/// Ordered tag values: same rules as `tag`, plus a mandatory non-negative
/// order index establishing a stable position among same-named values.
pub struct OrderedTagValidator;

impl AttributeValidator for OrderedTagValidator {
    fn validate(&self, value: &str, order_index: Option<i64>) -> ValidationResult {
        if let Some(invalid) = check_result(check_length(value, MAX_TAG_LENGTH)) {
            return invalid;
        }
        if let Some(invalid) = check_result(check_forbidden_chars(value)) {
            return invalid;
        }

        let index = match order_index {
            Some(index) => index,
            None => {
                return ValidationResult::invalid("order_index is required for ordered_tag type")
            }
        };
        if index < 0 {
            return ValidationResult::invalid("order_index must be non-negative");
        }

        let normalized = normalize_case(value);
        if normalized.is_empty() {
            return ValidationResult::invalid("value cannot be empty");
        }
        ValidationResult::valid(normalized)
    }

    fn attribute_type(&self) -> AttributeType {
        AttributeType::OrderedTag
    }

    fn description(&self) -> &'static str {
        "Ordered tag. order_index is required and must be non-negative."
    }
}

/// Numeric values, stored verbatim.
pub struct NumberValidator;

impl AttributeValidator for NumberValidator {
    fn validate(&self, value: &str, order_index: Option<i64>) -> ValidationResult {
        if value.parse::<f64>().is_err() {
            return ValidationResult::invalid(format!("invalid number format: {value}"));
        }
        if let Some(invalid) = check_result(check_no_order_index(order_index, "number")) {
            return invalid;
        }

        // No normalization for numbers; the literal is stored as-is.
        ValidationResult::valid(value)
    }

    fn attribute_type(&self) -> AttributeType {
        AttributeType::Number
    }

    fn description(&self) -> &'static str {
        "Numeric value, integer or decimal."
    }
}

/// Free-form strings: trimmed, case preserved.
pub struct StringValidator;

impl AttributeValidator for StringValidator {
    fn validate(&self, value: &str, order_index: Option<i64>) -> ValidationResult {
        if let Some(invalid) = check_result(check_length(value, MAX_STRING_LENGTH)) {
            return invalid;
        }
        if let Some(invalid) = check_result(check_no_order_index(order_index, "string")) {
            return invalid;
        }

        let normalized = value.trim();
        if normalized.is_empty() {
            return ValidationResult::invalid("value cannot be empty");
        }
        ValidationResult::valid(normalized)
    }

    fn attribute_type(&self) -> AttributeType {
        AttributeType::String
    }

    fn description(&self) -> &'static str {
        "Plain string, up to 500 characters."
    }
}

/// Markdown text: trimmed, formatting preserved, brackets and parentheses
/// must balance (simple counter, no escaping awareness).
pub struct MarkdownValidator;

impl MarkdownValidator {
    fn has_balanced_syntax(value: &str) -> bool {
        let mut square_brackets: i64 = 0;
        let mut parentheses: i64 = 0;

        for c in value.chars() {
            match c {
                '[' => square_brackets += 1,
                ']' => {
                    square_brackets -= 1;
                    if square_brackets < 0 {
                        return false;
                    }
                }
                '(' => parentheses += 1,
                ')' => {
                    parentheses -= 1;
                    if parentheses < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }

        square_brackets == 0 && parentheses == 0
    }
}

impl AttributeValidator for MarkdownValidator {
    fn validate(&self, value: &str, order_index: Option<i64>) -> ValidationResult {
        if let Some(invalid) = check_result(check_length(value, MAX_MARKDOWN_LENGTH)) {
            return invalid;
        }
        if let Some(invalid) = check_result(check_no_order_index(order_index, "markdown")) {
            return invalid;
        }
        if !Self::has_balanced_syntax(value) {
            return ValidationResult::invalid(
                "invalid markdown syntax: unbalanced brackets or parentheses",
            );
        }

        let normalized = value.trim();
        if normalized.is_empty() {
            return ValidationResult::invalid("value cannot be empty");
        }
        ValidationResult::valid(normalized)
    }

    fn attribute_type(&self) -> AttributeType {
        AttributeType::Markdown
    }

    fn description(&self) -> &'static str {
        "Markdown text, up to 10,000 characters."
    }
}

/// Image references: either a base64 data URL with a supported MIME type and
/// a decoded payload of at most 10 MiB, or an http(s) URL with a host.
pub struct ImageValidator;

impl ImageValidator {
    fn validate_data_url(value: &str) -> ValidationResult {
        let Some((mime_type, payload)) = value.split_once(BASE64_SEPARATOR) else {
            return ValidationResult::invalid("data URL must use base64 encoding");
        };

        if !SUPPORTED_IMAGE_TYPES.contains(&mime_type) {
            let short = mime_type.trim_start_matches(DATA_IMAGE_PREFIX);
            return ValidationResult::invalid(format!(
                "unsupported image type: {short}. Supported types: jpeg, png, gif, webp"
            ));
        }

        let decoded = match BASE64_STANDARD.decode(payload) {
            Ok(decoded) => decoded,
            Err(_) => return ValidationResult::invalid("invalid base64 encoding"),
        };

        if decoded.len() > MAX_IMAGE_SIZE {
            let actual_mb = decoded.len() as f64 / (1024.0 * 1024.0);
            return ValidationResult::invalid(format!(
                "image size exceeds maximum limit of 10MB (actual: {actual_mb:.2}MB)"
            ));
        }

        // Data URL is stored as-is.
        ValidationResult::valid(value)
    }

    fn validate_http_url(value: &str) -> ValidationResult {
        let parsed = match Url::parse(value) {
            Ok(parsed) => parsed,
            Err(_) => return ValidationResult::invalid("invalid URL format"),
        };

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return ValidationResult::invalid("URL must use http or https scheme");
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return ValidationResult::invalid("URL must have a valid host");
        }

        ValidationResult::valid(value)
    }
}

impl AttributeValidator for ImageValidator {
    fn validate(&self, value: &str, order_index: Option<i64>) -> ValidationResult {
        if let Some(invalid) = check_result(check_no_order_index(order_index, "image")) {
            return invalid;
        }

        if value.starts_with(DATA_IMAGE_PREFIX) {
            Self::validate_data_url(value)
        } else if value.starts_with("http://") || value.starts_with("https://") {
            Self::validate_http_url(value)
        } else {
            ValidationResult::invalid(
                "image must be either data URL (data:image/...) or HTTP(S) URL",
            )
        }
    }

    fn attribute_type(&self) -> AttributeType {
        AttributeType::Image
    }

    fn description(&self) -> &'static str {
        "Image as a base64 data URL or an HTTP(S) URL. Decoded payloads up to 10MB."
    }
}
