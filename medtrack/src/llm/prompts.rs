//! Prompt templates for drug lookup and prescription-bag extraction.

/// Asks for reference information about one drug as a flat JSON object.
pub fn drug_info_prompt(drug_name: &str) -> String {
    format!(
        r#"Provide reference information about the medicine "{drug_name}".

Respond with a single JSON object and nothing else, using these keys:
{{
  "name": "official product name",
  "category": "drug class",
  "efficacy": "what it treats",
  "dosage": "typical usage and dosage",
  "warnings": "precautions",
  "side_effects": "common side effects",
  "storage": "storage instructions"
}}

Use null for anything you do not know. Do not invent a product that does not exist."#
    )
}

/// Extraction prompt for a photo of a pharmacy bag or prescription.
pub fn scan_extraction_prompt() -> String {
    r#"This image shows a pharmacy medicine bag or prescription.
Read it and respond with a single JSON object and nothing else:
{
  "medicines": ["each drug product name exactly as printed"],
  "hospital": "issuing hospital or pharmacy name, or null",
  "date": "dispensing date as printed (e.g. 2024-03-09, 24.03.09, 2024년 3월 9일), or \"unknown\""
}

List every medicine you can read. If nothing is legible return an empty list."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drug_info_prompt_names_drug() {
        let prompt = drug_info_prompt("Tylenol");
        assert!(prompt.contains("\"Tylenol\""));
        assert!(prompt.contains("side_effects"));
    }

    #[test]
    fn test_scan_prompt_lists_keys() {
        let prompt = scan_extraction_prompt();
        for key in ["medicines", "hospital", "date"] {
            assert!(prompt.contains(key));
        }
    }
}
