//! Response schema declared to the provider for crop diagnosis.
//!
//! Gemini accepts an OpenAPI-subset schema with upper-case type names.

/// Field names of the diagnosis object, in declaration order.
pub const DIAGNOSIS_FIELDS: [&str; 4] = ["problemName", "description", "solution", "urgency"];

/// Build the diagnosis response schema: an object with four required strings.
#[must_use]
pub fn diagnosis_schema() -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = DIAGNOSIS_FIELDS
        .iter()
        .map(|field| ((*field).to_string(), serde_json::json!({ "type": "STRING" })))
        .collect();

    serde_json::json!({
        "type": "OBJECT",
        "properties": properties,
        "required": DIAGNOSIS_FIELDS,
    })
}
