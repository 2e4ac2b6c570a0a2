//! Form drafts - editable field lists serialized for submission

use std::path::PathBuf;

use crate::constants::MISSING_PATIENT_ID;
use crate::models::{Attachment, FormPayload};

/// Multipart field name for uploaded reports
pub const REPORT_FIELD: &str = "test_report";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Local path of a file to attach
    File,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    default: String,
}

impl FormField {
    fn text(name: &'static str, label: &'static str) -> Self {
        FormField {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
            value: String::new(),
            default: String::new(),
        }
    }

    fn file(name: &'static str, label: &'static str) -> Self {
        FormField {
            kind: FieldKind::File,
            ..FormField::text(name, label)
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self.value = self.default.clone();
        self
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Validation message shown when a required field is blank
    pub fn missing_message(&self) -> String {
        if self.name == "patient_id" {
            MISSING_PATIENT_ID.to_string()
        } else {
            format!("Enter {}", self.label.to_lowercase())
        }
    }
}

/// Ordered fields with a focus cursor
#[derive(Clone, Debug, PartialEq)]
pub struct FormDraft {
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl FormDraft {
    fn from_fields(fields: Vec<FormField>) -> Self {
        FormDraft { fields, focus: 0 }
    }

    /// Patient lookup and summary options
    pub fn lookup() -> Self {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        Self::from_fields(vec![
            FormField::text("patient_id", "Patient ID"),
            FormField::text("discharge_date", "Discharge Date").with_default(today),
            FormField::text("doctor_notes", "Doctor Notes"),
        ])
    }

    /// New patient registration
    pub fn patient_intake() -> Self {
        Self::from_fields(vec![
            FormField::text("name", "Name").required(),
            FormField::text("sex", "Sex"),
            FormField::text("state", "State"),
            FormField::text("general_health", "General Health"),
            FormField::text("chronic_condition", "Chronic Condition").with_default("No"),
            FormField::text("stay_duration", "Stay Duration").with_default("1"),
            FormField::text("risk_category", "Risk Category"),
            FormField::text("doctor_name", "Doctor Name"),
            FormField::text("allergies", "Allergies"),
            FormField::text("admission_date", "Admission Date"),
            FormField::text("discharge_date", "Discharge Date"),
            FormField::text("chief_complaint", "Chief Complaint"),
            FormField::file(REPORT_FIELD, "Test Report File"),
        ])
    }

    /// Test report attachment for an existing patient
    pub fn report_upload() -> Self {
        Self::from_fields(vec![
            FormField::text("patient_id", "Patient ID").required(),
            FormField::file(REPORT_FIELD, "Test Report File").required(),
        ])
    }

    pub fn value(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.value = value.into();
        }
    }

    pub fn focused(&self) -> Option<&FormField> {
        self.fields.get(self.focus)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    /// First required field left blank
    pub fn missing_required(&self) -> Option<&FormField> {
        self.fields.iter().find(|f| f.required && f.is_blank())
    }

    /// Serialize every text field as typed; a non-blank file field becomes
    /// the attachment.
    pub fn payload(&self) -> FormPayload {
        let mut payload = FormPayload::default();
        for field in &self.fields {
            match field.kind {
                FieldKind::Text => payload
                    .fields
                    .push((field.name.to_string(), field.value.clone())),
                FieldKind::File if !field.is_blank() => {
                    payload.attachment = Some(Attachment {
                        field: field.name.to_string(),
                        path: PathBuf::from(field.value.trim()),
                    });
                }
                FieldKind::File => {}
            }
        }
        payload
    }

    /// Restore every field to its default and focus the first one
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value = field.default.clone();
        }
        self.focus = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_passes_values_through_untouched() {
        let mut form = FormDraft::patient_intake();
        form.set("name", "  Asha Verma ");
        form.set(REPORT_FIELD, "/tmp/scan.pdf");

        let payload = form.payload();
        assert_eq!(payload.get("name"), Some("  Asha Verma "));
        assert_eq!(payload.get("chronic_condition"), Some("No"));
        assert_eq!(payload.fields.len(), 12);
        let attachment = payload.attachment.unwrap();
        assert_eq!(attachment.field, "test_report");
        assert_eq!(attachment.path, PathBuf::from("/tmp/scan.pdf"));
    }

    #[test]
    fn test_blank_file_field_sends_no_attachment() {
        let form = FormDraft::patient_intake();
        assert!(form.payload().attachment.is_none());
    }

    #[test]
    fn test_presence_checks_name_required_fields() {
        let mut form = FormDraft::report_upload();
        assert_eq!(form.missing_required().unwrap().missing_message(), "Enter a patient ID");

        form.set("patient_id", "42");
        assert_eq!(
            form.missing_required().unwrap().missing_message(),
            "Enter test report file"
        );

        form.set(REPORT_FIELD, "report.png");
        assert!(form.missing_required().is_none());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut form = FormDraft::report_upload();
        form.set("patient_id", "42");
        form.next_field();
        form.push_char('x');
        form.reset();
        assert_eq!(form.value("patient_id"), "");
        assert_eq!(form.value(REPORT_FIELD), "");
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let mut form = FormDraft::lookup();
        form.prev_field();
        assert_eq!(form.focused().unwrap().name, "doctor_notes");
        form.next_field();
        assert_eq!(form.focused().unwrap().name, "patient_id");
    }
}
