//! JSON dump of the report sections

use super::ReportRenderer;
use crate::constants::report::JSON_FILE;
use crate::pipeline::ReportDocument;
use crate::types::Result;

pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn file_name(&self) -> &'static str {
        JSON_FILE
    }

    fn render(&self, doc: &ReportDocument) -> Result<String> {
        let mut output = serde_json::to_string_pretty(doc)?;
        output.push('\n');
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_sections() {
        let doc = ReportDocument {
            title: "T".to_string(),
            sections: Vec::new(),
        };
        let out = JsonRenderer.render(&doc).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["title"], "T");
        assert!(value["sections"].as_array().unwrap().is_empty());
    }
}
