use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// UI color theme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggle(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// The single persisted UI preference
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
}

/// Accepts any JSON scalar as display text; the backend is loose about
/// sending ages and durations as numbers or strings.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => Some(n.as_i64().unwrap_or(0) != 0),
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn yes_no(flag: Option<bool>) -> &'static str {
    if flag.unwrap_or(false) {
        "Yes"
    } else {
        "No"
    }
}

/// Raw backend reply: either an explicit `{error}` or the expected payload.
///
/// The error variant is tried first, so any payload carrying an `error`
/// string is an application-level failure.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiReply<T> {
    Failure { error: String },
    Success(T),
}

impl<T> ApiReply<T> {
    pub fn into_result(self) -> Result<T, String> {
        match self {
            ApiReply::Failure { error } => Err(error),
            ApiReply::Success(payload) => Ok(payload),
        }
    }
}

/// Patient record data returned by `/preview`
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PatientPreview {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sex: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub chief_complaint: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub disease: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub stay_duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub chronic: Option<bool>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub doctor_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub allergies: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub admission_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub discharge_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub test_reports: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_fallback: Option<bool>,
}

impl PatientPreview {
    pub fn is_fallback(&self) -> bool {
        self.is_fallback.unwrap_or(false)
    }

    /// Labelled lines for the preview pane. Test reports resolve against the
    /// backend base URL.
    pub fn fields(&self, base_url: &str) -> Vec<(&'static str, String)> {
        let report = match self.test_reports.as_deref() {
            Some(path) if !path.trim().is_empty() => {
                format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
            }
            _ => "None".to_string(),
        };

        vec![
            ("Name", text(&self.name).to_string()),
            ("Sex", text(&self.sex).to_string()),
            ("Age", text(&self.age).to_string()),
            ("State", text(&self.state).to_string()),
            ("Chief Complaint", text(&self.chief_complaint).to_string()),
            ("Diagnosis", text(&self.disease).to_string()),
            ("Hospital Stay", format!("{} days", text(&self.stay_duration))),
            ("Chronic Condition", yes_no(self.chronic).to_string()),
            ("Doctor", text(&self.doctor_name).to_string()),
            ("Allergies", text(&self.allergies).to_string()),
            ("Admission Date", text(&self.admission_date).to_string()),
            ("Discharge Date", text(&self.discharge_date).to_string()),
            ("Test Reports", report),
        ]
    }
}

/// Generated discharge summary
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DischargeSummary {
    #[serde(default, deserialize_with = "lenient_text")]
    pub chief_complaint: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hpi: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub past_history: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub social_history: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub allergies: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub physical_exam: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lab_data: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hospital_course: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub diagnosis: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub medications: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub diet: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub activity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub follow_up: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub discharge_instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ai_notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub admission_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub discharge_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub doctor_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_fallback: Option<bool>,
}

impl DischargeSummary {
    /// (panel label, clipboard label, value) in the fixed summary order
    fn entries(&self) -> [(&'static str, &'static str, &Option<String>); 20] {
        [
            ("Chief Complaint", "Chief Complaint", &self.chief_complaint),
            ("History of Present Illness", "HPI", &self.hpi),
            ("Past History", "Past History", &self.past_history),
            ("Social History", "Social History", &self.social_history),
            ("Allergies", "Allergies", &self.allergies),
            ("Physical Exam", "Physical Exam", &self.physical_exam),
            ("Laboratory Data", "Lab Data", &self.lab_data),
            ("Hospital Course", "Hospital Course", &self.hospital_course),
            ("Condition", "Condition", &self.condition),
            ("Diagnoses", "Diagnoses", &self.diagnosis),
            ("Medications", "Medications", &self.medications),
            ("Diet", "Diet", &self.diet),
            ("Activity", "Activity", &self.activity),
            ("Follow-Up", "Follow-Up", &self.follow_up),
            ("Instructions", "Instructions", &self.discharge_instructions),
            ("AI Notes", "AI Notes", &self.ai_notes),
            ("Admission Date", "Admission", &self.admission_date),
            ("Discharge Date", "Discharge", &self.discharge_date),
            ("Doctor", "Doctor", &self.doctor_name),
            ("Age", "Age", &self.age),
        ]
    }

    pub fn is_fallback(&self) -> bool {
        self.is_fallback.unwrap_or(false)
    }

    /// Labelled sections for the result pane
    pub fn sections(&self) -> Vec<(&'static str, String)> {
        self.entries()
            .iter()
            .map(|(label, _, value)| (*label, text(value).to_string()))
            .collect()
    }

    /// Plain-text block for the clipboard: one `Label: value` line per
    /// field, empty values included.
    pub fn clipboard_text(&self) -> String {
        self.entries()
            .iter()
            .map(|(_, label, value)| format!("{}: {}", label, text(value)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Payload of a successful `/generate`
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GenerateReply {
    #[serde(default)]
    pub summary: DischargeSummary,
    /// Server-issued token for `/download/<token>`
    #[serde(default)]
    pub pdf_file: Option<String>,
}

/// One row of `/view_database`
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PatientRow {
    #[serde(rename = "PatientID", default, deserialize_with = "lenient_text")]
    pub patient_id: Option<String>,
    #[serde(rename = "Name", default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(rename = "Sex", default, deserialize_with = "lenient_text")]
    pub sex: Option<String>,
    #[serde(rename = "State", default, deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(rename = "GeneralHealth", default, deserialize_with = "lenient_text")]
    pub general_health: Option<String>,
    #[serde(rename = "HasChronicCondition", default, deserialize_with = "lenient_flag")]
    pub has_chronic_condition: Option<bool>,
    #[serde(rename = "HospitalStayDuration", default, deserialize_with = "lenient_text")]
    pub hospital_stay_duration: Option<String>,
    #[serde(rename = "RiskCategory", default, deserialize_with = "lenient_text")]
    pub risk_category: Option<String>,
    #[serde(rename = "DoctorName", default, deserialize_with = "lenient_text")]
    pub doctor_name: Option<String>,
    #[serde(rename = "Allergies", default, deserialize_with = "lenient_text")]
    pub allergies: Option<String>,
    #[serde(rename = "ChiefComplaint", default, deserialize_with = "lenient_text")]
    pub chief_complaint: Option<String>,
    #[serde(rename = "AdmissionDate", default, deserialize_with = "lenient_text")]
    pub admission_date: Option<String>,
    #[serde(rename = "DischargeDate", default, deserialize_with = "lenient_text")]
    pub discharge_date: Option<String>,
    #[serde(rename = "TestReports", default, deserialize_with = "lenient_text")]
    pub test_reports: Option<String>,
}

impl PatientRow {
    pub const COLUMNS: [&'static str; 14] = [
        "ID",
        "Name",
        "Sex",
        "State",
        "Health",
        "Chronic",
        "Stay",
        "Risk",
        "Doctor",
        "Allergies",
        "Complaint",
        "Admitted",
        "Discharged",
        "Report",
    ];

    pub fn cells(&self) -> [String; 14] {
        let report = match self.test_reports.as_deref() {
            Some(path) if !path.trim().is_empty() => path.to_string(),
            _ => "None".to_string(),
        };
        [
            text(&self.patient_id).to_string(),
            text(&self.name).to_string(),
            text(&self.sex).to_string(),
            text(&self.state).to_string(),
            text(&self.general_health).to_string(),
            yes_no(self.has_chronic_condition).to_string(),
            text(&self.hospital_stay_duration).to_string(),
            text(&self.risk_category).to_string(),
            text(&self.doctor_name).to_string(),
            text(&self.allergies).to_string(),
            text(&self.chief_complaint).to_string(),
            text(&self.admission_date).to_string(),
            text(&self.discharge_date).to_string(),
            report,
        ]
    }
}

/// One page of `/view_database?ajax=true`
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PatientPage {
    #[serde(default)]
    pub patients: Vec<PatientRow>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_page: Option<u32>,
}

/// Successful form submission
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SubmitReceipt {
    #[serde(default)]
    pub message: Option<String>,
    /// Location to navigate to after the notification has been seen
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Summary verbosity requested from `/generate`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetailLevel {
    Brief,
    #[default]
    Detailed,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Brief => "brief",
            DetailLevel::Detailed => "detailed",
        }
    }

    pub fn next(&self) -> DetailLevel {
        match self {
            DetailLevel::Brief => DetailLevel::Detailed,
            DetailLevel::Detailed => DetailLevel::Brief,
        }
    }
}

/// Extra `/generate` form fields
#[derive(Clone, Debug, PartialEq)]
pub struct GenerateOptions {
    pub detail_level: DetailLevel,
    pub doctor_notes: String,
    pub discharge_date: String,
}

/// File attached to a multipart submission
#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    pub field: String,
    pub path: PathBuf,
}

/// Serialized form: text fields in declaration order plus an optional file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormPayload {
    pub fields: Vec<(String, String)>,
    pub attachment: Option<Attachment>,
}

impl FormPayload {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
