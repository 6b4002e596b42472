//! Built-in templates for error fragments and failure pages

use serde_json::{json, Value};

/// Registry name of the diagnostic fragment template
pub const DIAGNOSTIC_TEMPLATE: &str = "__diagnostic";

/// Registry name of the standalone failure page template
pub const FAILURE_TEMPLATE: &str = "__failure";

/// Fragment placed in a slot whose own template failed to draw
pub fn diagnostic_template() -> Value {
    json!({
        "width": 800,
        "height": 800,
        "definitions": [
            {
                "name": "header",
                "type": "textBlock",
                "position": [200, 380],
                "align": "center",
                "field": "header",
                "font": { "size": 24, "color": "#FF0000" }
            },
            {
                "name": "stack",
                "type": "textBlock",
                "position": [5, 360],
                "field": "stack",
                "font": { "size": 10, "color": "#FF0000" }
            }
        ],
        "data": { "header": "Error", "stack": [] }
    })
}

/// A whole page reporting a failure that happened before any batch existed
pub fn failure_template() -> Value {
    json!({
        "width": 600,
        "height": 400,
        "definitions": [
            {
                "name": "header",
                "type": "textBlock",
                "position": [300, 380],
                "align": "center",
                "field": "header",
                "font": { "size": 24, "color": "#FF0000" }
            },
            {
                "name": "stack",
                "type": "textBlock",
                "position": [5, 360],
                "field": "stack",
                "font": { "size": 10, "color": "#FF0000" }
            }
        ],
        "data": { "header": "Error", "stack": [] }
    })
}

/// Record for either template: a header plus one line per error in the chain
pub fn diagnostic_record(header: &str, error: &dyn std::error::Error) -> Value {
    let mut stack = vec![Value::String(error.to_string())];
    let mut source = error.source();
    while let Some(cause) = source {
        stack.push(Value::String(format!("caused by: {}", cause)));
        source = cause.source();
    }
    json!({ "header": header, "stack": stack })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::RawTemplate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_templates_parse() {
        let diagnostic = RawTemplate::from_value(DIAGNOSTIC_TEMPLATE, diagnostic_template()).unwrap();
        assert_eq!(diagnostic.definitions.len(), 2);
        assert_eq!(diagnostic.width, Some(800.0));

        let failure = RawTemplate::from_value(FAILURE_TEMPLATE, failure_template()).unwrap();
        assert_eq!(failure.height, Some(400.0));
    }

    #[test]
    fn test_record_lists_error() {
        let err = crate::compile::RenderError::missing_image("logo");
        let record = diagnostic_record("Error", &err);
        assert_eq!(
            record,
            json!({ "header": "Error", "stack": ["image resource 'logo' not found"] })
        );
    }
}
