//! Prompt text and response schema.

use chrono::NaiveDate;
use idverify_core::record::IdentityRecord;
use serde_json::{Value, json};

pub fn judge_prompt(record: &IdentityRecord, today: NaiveDate) -> String {
  format!(
    "Act as an institutional security system. Analyze this card holder for \
     access eligibility.\n\n\
     Holder details:\n\
     Name: {name}\n\
     Status: {status}\n\
     Valid until: {valid_till}\n\
     Department: {department}\n\n\
     Today's date: {today}\n\n\
     Rules:\n\
     1. Status MUST be active.\n\
     2. The valid-until date must not be before today.\n\
     3. If suspended or inactive, deny access.\n\n\
     Return a JSON response.",
    name = record.name,
    status = record.status.as_str(),
    valid_till = record.valid_till,
    department = record.department,
  )
}

pub fn summary_prompt(record: &IdentityRecord) -> String {
  format!(
    "Generate a brief, professional 2-sentence summary for an ID card \
     profile.\n\
     Holder: {name}, Designation: {designation}, Department: {department}, \
     Status: {status}.\n\
     Tone: Formal and administrative.",
    name = record.name,
    designation = record.designation,
    department = record.department,
    status = record.status.as_str(),
  )
}

/// `responseSchema` forcing `{allowed: bool, reason: string}`.
pub fn verdict_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "allowed": { "type": "BOOLEAN" },
      "reason":  { "type": "STRING" }
    },
    "required": ["allowed", "reason"]
  })
}
