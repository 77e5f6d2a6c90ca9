//! Client-side validation of the two raw text fields.

use serde_json::Value;

/// Why the raw input cannot be sent. The `Display` text is what the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Please enter JSON data")]
    EmptyJson,
    #[error("Please enter dashboard instructions")]
    EmptyInstruction,
    #[error("Invalid JSON format. Please check your JSON syntax.")]
    MalformedJson,
}

/// Input that passed validation and is ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidInput {
    pub json: Value,
    pub instruction: String,
}

/// null, false, 0 and "" parse fine but carry no data.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Check the pasted JSON text and the instruction.
///
/// Checks run in a fixed order (empty JSON, empty instruction, then parse) and
/// the first failure wins, so the same input always yields the same message.
/// JSON that parses to a falsy value is reported as malformed.
pub fn validate_input(
    json_text: &str,
    instruction_text: &str,
) -> Result<ValidInput, InputError> {
    if json_text.trim().is_empty() {
        return Err(InputError::EmptyJson);
    }

    if instruction_text.trim().is_empty() {
        return Err(InputError::EmptyInstruction);
    }

    let json: Value = serde_json::from_str(json_text).map_err(|_| InputError::MalformedJson)?;
    if is_falsy(&json) {
        return Err(InputError::MalformedJson);
    }

    Ok(ValidInput {
        json,
        instruction: instruction_text.to_string(),
    })
}
