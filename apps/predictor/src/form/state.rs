use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::AppError;

// ────────────────────────────────────────────────────────────────────────────
// Option sets
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkExperience {
    Yes,
    #[default]
    No,
}

impl WorkExperience {
    /// Rendering order for the `<select>` control.
    pub const ALL: [WorkExperience; 2] = [WorkExperience::No, WorkExperience::Yes];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkExperience::Yes => "yes",
            WorkExperience::No => "no",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkExperience::Yes => "Yes",
            WorkExperience::No => "No",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CpLevel {
    #[default]
    None,
    Basic,
    Intermediate,
    Good,
    Strong,
}

impl CpLevel {
    pub const ALL: [CpLevel; 5] = [
        CpLevel::None,
        CpLevel::Basic,
        CpLevel::Intermediate,
        CpLevel::Good,
        CpLevel::Strong,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CpLevel::None => "none",
            CpLevel::Basic => "basic",
            CpLevel::Intermediate => "intermediate",
            CpLevel::Good => "good",
            CpLevel::Strong => "strong",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CpLevel::None => "None",
            CpLevel::Basic => "Basic",
            CpLevel::Intermediate => "Intermediate",
            CpLevel::Good => "Good",
            CpLevel::Strong => "Strong",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field names and inputs
// ────────────────────────────────────────────────────────────────────────────

/// Every editable field on the form, named by its wire key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    SscP,
    HscP,
    DegreeP,
    EtestP,
    MbaP,
    Workex,
    Projects,
    Internships,
    Hackathons,
    Clubs,
    CpLevel,
    HasDsa,
    HasWeb,
    HasMl,
    HasApp,
    HasCloud,
}

impl FormField {
    pub const ALL: [FormField; 16] = [
        FormField::SscP,
        FormField::HscP,
        FormField::DegreeP,
        FormField::EtestP,
        FormField::MbaP,
        FormField::Workex,
        FormField::Projects,
        FormField::Internships,
        FormField::Hackathons,
        FormField::Clubs,
        FormField::CpLevel,
        FormField::HasDsa,
        FormField::HasWeb,
        FormField::HasMl,
        FormField::HasApp,
        FormField::HasCloud,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormField::SscP => "ssc_p",
            FormField::HscP => "hsc_p",
            FormField::DegreeP => "degree_p",
            FormField::EtestP => "etest_p",
            FormField::MbaP => "mba_p",
            FormField::Workex => "workex",
            FormField::Projects => "projects",
            FormField::Internships => "internships",
            FormField::Hackathons => "hackathons",
            FormField::Clubs => "clubs",
            FormField::CpLevel => "cp_level",
            FormField::HasDsa => "has_dsa",
            FormField::HasWeb => "has_web",
            FormField::HasMl => "has_ml",
            FormField::HasApp => "has_app",
            FormField::HasCloud => "has_cloud",
        }
    }

    pub fn is_checkbox(&self) -> bool {
        matches!(
            self,
            FormField::HasDsa
                | FormField::HasWeb
                | FormField::HasMl
                | FormField::HasApp
                | FormField::HasCloud
        )
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// The value carried by a single change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    Value(String),
    Checked(bool),
}

impl FieldInput {
    fn into_text(self) -> String {
        match self {
            FieldInput::Value(v) => v,
            FieldInput::Checked(b) => b.to_string(),
        }
    }

    fn into_checked(self) -> bool {
        match self {
            FieldInput::Checked(b) => b,
            FieldInput::Value(v) => matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "on" | "true" | "1" | "yes"
            ),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FormState
// ────────────────────────────────────────────────────────────────────────────

/// Raw, loosely-typed form input. Coercion happens in `payload::build`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormState {
    pub ssc_p: String,
    pub hsc_p: String,
    pub degree_p: String,
    pub etest_p: String,
    pub workex: String,

    pub projects: String,
    pub internships: String,
    pub hackathons: String,
    pub clubs: String,
    pub cp_level: String,

    pub has_dsa: bool,
    pub has_web: bool,
    pub has_ml: bool,
    pub has_app: bool,
    pub has_cloud: bool,

    pub mba_p: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            ssc_p: String::new(),
            hsc_p: String::new(),
            degree_p: String::new(),
            etest_p: String::new(),
            workex: WorkExperience::default().as_str().to_string(),
            projects: "0".to_string(),
            internships: "0".to_string(),
            hackathons: "0".to_string(),
            clubs: "0".to_string(),
            cp_level: CpLevel::default().as_str().to_string(),
            has_dsa: false,
            has_web: false,
            has_ml: false,
            has_app: false,
            has_cloud: false,
            mba_p: String::new(),
        }
    }
}

impl FormState {
    /// Returns a new snapshot with `field` replaced and every other field untouched.
    /// Never fails: malformed input is kept verbatim for the payload builder to default.
    pub fn set_field(&self, field: FormField, input: FieldInput) -> FormState {
        let mut next = self.clone();
        match field {
            FormField::SscP => next.ssc_p = input.into_text(),
            FormField::HscP => next.hsc_p = input.into_text(),
            FormField::DegreeP => next.degree_p = input.into_text(),
            FormField::EtestP => next.etest_p = input.into_text(),
            FormField::MbaP => next.mba_p = input.into_text(),
            FormField::Workex => next.workex = input.into_text(),
            FormField::Projects => next.projects = input.into_text(),
            FormField::Internships => next.internships = input.into_text(),
            FormField::Hackathons => next.hackathons = input.into_text(),
            FormField::Clubs => next.clubs = input.into_text(),
            FormField::CpLevel => next.cp_level = input.into_text(),
            FormField::HasDsa => next.has_dsa = input.into_checked(),
            FormField::HasWeb => next.has_web = input.into_checked(),
            FormField::HasMl => next.has_ml = input.into_checked(),
            FormField::HasApp => next.has_app = input.into_checked(),
            FormField::HasCloud => next.has_cloud = input.into_checked(),
        }
        next
    }

    /// Current value of `field`, in the same shape `set_field` accepts.
    pub fn get_field(&self, field: FormField) -> FieldInput {
        let text = match field {
            FormField::SscP => &self.ssc_p,
            FormField::HscP => &self.hsc_p,
            FormField::DegreeP => &self.degree_p,
            FormField::EtestP => &self.etest_p,
            FormField::MbaP => &self.mba_p,
            FormField::Workex => &self.workex,
            FormField::Projects => &self.projects,
            FormField::Internships => &self.internships,
            FormField::Hackathons => &self.hackathons,
            FormField::Clubs => &self.clubs,
            FormField::CpLevel => &self.cp_level,
            FormField::HasDsa => return FieldInput::Checked(self.has_dsa),
            FormField::HasWeb => return FieldInput::Checked(self.has_web),
            FormField::HasMl => return FieldInput::Checked(self.has_ml),
            FormField::HasApp => return FieldInput::Checked(self.has_app),
            FormField::HasCloud => return FieldInput::Checked(self.has_cloud),
        };
        FieldInput::Value(text.clone())
    }

    /// Builds a snapshot from a posted HTML form. Unchecked checkboxes are absent
    /// from a form post, so every field starts from its default.
    pub fn from_submission(pairs: &[(String, String)]) -> Result<FormState, AppError> {
        pairs
            .iter()
            .try_fold(FormState::default(), |state, (name, value)| {
                let field: FormField = name
                    .parse()
                    .map_err(|e: UnknownField| AppError::Validation(e.to_string()))?;
                Ok(state.set_field(field, FieldInput::Value(value.clone())))
            })
    }
}
