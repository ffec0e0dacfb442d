//! Server-side HTML for the form page.
//!
//! The template is a `.html` file, so minijinja escapes every interpolated value.

use minijinja::Environment;
use serde::Serialize;

use crate::form::{CpLevel, FieldInput, FormField, FormState, WorkExperience};
use crate::submission::{self, ResultView, SubmissionState};

const PAGE_TEMPLATE: &str = include_str!("page.html");

const PERCENTAGE_FIELDS: [FormField; 4] = [
    FormField::SscP,
    FormField::HscP,
    FormField::DegreeP,
    FormField::EtestP,
];

const COUNT_FIELDS: [FormField; 4] = [
    FormField::Projects,
    FormField::Internships,
    FormField::Hackathons,
    FormField::Clubs,
];

#[derive(Debug, Serialize)]
struct InputField {
    name: &'static str,
    label: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct SelectOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct Checkbox {
    name: &'static str,
    label: &'static str,
    checked: bool,
}

#[derive(Debug, Serialize)]
struct PageContext {
    percentages: Vec<InputField>,
    counts: Vec<InputField>,
    workex_options: Vec<SelectOption>,
    cp_level_options: Vec<SelectOption>,
    skills: Vec<Checkbox>,
    mba_p: String,
    loading: bool,
    view: ResultView,
}

/// Holds the compiled page template. Built once at startup and shared by all handlers.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("page.html", PAGE_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(
        &self,
        form: &FormState,
        state: &SubmissionState,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("page.html")?.render(context(form, state))
    }
}

fn context(form: &FormState, state: &SubmissionState) -> PageContext {
    PageContext {
        percentages: PERCENTAGE_FIELDS.iter().map(|f| input(form, *f)).collect(),
        counts: COUNT_FIELDS.iter().map(|f| input(form, *f)).collect(),
        workex_options: WorkExperience::ALL
            .iter()
            .map(|o| SelectOption {
                value: o.as_str(),
                label: o.label(),
                selected: form.workex == o.as_str(),
            })
            .collect(),
        cp_level_options: CpLevel::ALL
            .iter()
            .map(|o| SelectOption {
                value: o.as_str(),
                label: o.label(),
                selected: form.cp_level == o.as_str(),
            })
            .collect(),
        skills: FormField::ALL
            .iter()
            .filter(|f| f.is_checkbox())
            .map(|f| Checkbox {
                name: f.name(),
                label: label(*f),
                checked: form.get_field(*f) == FieldInput::Checked(true),
            })
            .collect(),
        mba_p: form.mba_p.clone(),
        loading: state.is_loading(),
        view: submission::render(state),
    }
}

fn input(form: &FormState, field: FormField) -> InputField {
    let value = match form.get_field(field) {
        FieldInput::Value(v) => v,
        FieldInput::Checked(b) => b.to_string(),
    };
    InputField {
        name: field.name(),
        label: label(field),
        value,
    }
}

fn label(field: FormField) -> &'static str {
    match field {
        FormField::SscP => "10th Percentage (SSC)",
        FormField::HscP => "12th Percentage (HSC)",
        FormField::DegreeP => "Degree Percentage",
        FormField::EtestP => "Employability Test %",
        FormField::MbaP => "MBA Percentage (optional)",
        FormField::Workex => "Work Experience",
        FormField::Projects => "Projects (count)",
        FormField::Internships => "Internships (count)",
        FormField::Hackathons => "Hackathons (count)",
        FormField::Clubs => "Clubs / Leadership (count)",
        FormField::CpLevel => "CP Level",
        FormField::HasDsa => "Data Structures & Algorithms",
        FormField::HasWeb => "Web Development",
        FormField::HasMl => "ML / AI",
        FormField::HasApp => "App Development",
        FormField::HasCloud => "Cloud / AWS",
    }
}
