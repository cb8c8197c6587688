pub mod classify;
pub mod decision;
pub mod keys;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod schema;
pub mod serializer;
pub mod synth;

use wasm_bindgen::prelude::*;

use decision::{DecisionProvider, FirstCandidate};
use parser::ParseError;
use resolve::{ResolveError, Resolver};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Resolve(#[from] ResolveError),
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Convert an ER model in XML form into its relational schema as JSON.
/// The run is all-or-nothing: any error discards the accumulated tables.
pub fn convert(xml: &str, provider: &mut dyn DecisionProvider) -> Result<String, ConvertError> {
    let model = parser::parse(xml)?;
    let schema = Resolver::new(&model, provider).resolve()?;
    Ok(serializer::to_json(&schema)?)
}

/// Convert an ER model to a relational schema, taking the first candidate
/// whenever a primary key choice is ambiguous (no console in the browser).
#[wasm_bindgen(js_name = "erToSchema")]
pub fn er_to_schema(xml: &str) -> Result<String, String> {
    convert(xml, &mut FirstCandidate).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Fixed;
    use serde_json::Value;

    const EMPLOYEE_MODEL: &str = r#"
        <erd>
            <entity id="e1" name="Employee">
                <attribute id="a1" name="SSN"/>
                <attribute id="a2" name="Email"/>
                <key>a1</key>
                <key>a2</key>
            </entity>
            <entity id="e2" name="Dependent">
                <attribute id="a3" name="Name"/>
                <attribute id="a4" relation_id="r1"/>
                <key>a4,a3</key>
            </entity>
            <relationship id="r1" name="DependsOn">
                <attribute id="p1" entity_id="e1"/>
                <attribute id="p2" entity_id="e2"/>
            </relationship>
        </erd>
    "#;

    #[test]
    fn test_convert_end_to_end() {
        let json = convert(EMPLOYEE_MODEL, &mut Fixed(0)).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["Employee"]["primary_key"], serde_json::json!(["SSN"]));
        assert_eq!(value["Employee"]["unique"], serde_json::json!(["Email"]));
        assert_eq!(value["Employee"]["foreign_keys"], serde_json::json!([]));
        assert_eq!(
            value["Dependent"]["primary_key"],
            serde_json::json!(["Employee_SSN", "Name"])
        );
        assert_eq!(
            value["DependsOn"]["foreign_keys"][0]["referenced_table"],
            "Employee"
        );
    }

    #[test]
    fn test_alternate_key_selection() {
        let json = convert(EMPLOYEE_MODEL, &mut Fixed(1)).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["Employee"]["primary_key"], serde_json::json!(["Email"]));
        assert_eq!(value["Employee"]["unique"], serde_json::json!(["SSN"]));
    }

    #[test]
    fn test_repeated_runs_are_byte_identical() {
        let first = convert(EMPLOYEE_MODEL, &mut Fixed(0)).unwrap();
        let second = convert(EMPLOYEE_MODEL, &mut Fixed(0)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wasm_entry_uses_first_candidate() {
        let json = er_to_schema(EMPLOYEE_MODEL).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["Employee"]["primary_key"], serde_json::json!(["SSN"]));
    }

    #[test]
    fn test_error_surfaces_without_partial_schema() {
        let err = convert("<erd>", &mut Fixed(0)).unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));
    }
}
