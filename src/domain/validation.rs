//! Declarative field rules for each step of the form.
//!
//! Every step owns a static list of [`FieldDescriptor`]s. Validation walks that
//! list in order and collects a message for every field whose rule fails; it
//! never errors out, it only reports.

use super::models::{Field, FormData, Step};

/// The check applied to a single field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Text with at least `min` characters.
    MinChars { min: usize, message: &'static str },
    /// A choice that must have been made.
    Selected { message: &'static str },
    /// A base-10 integer within `min..=max`, supplied as a string.
    IntRange {
        min: i64,
        max: i64,
        required: &'static str,
        out_of_range: &'static str,
    },
}

impl FieldRule {
    /// Checks a raw value, returning the failure message if the rule is not met.
    pub fn check(&self, value: &str) -> Result<(), &'static str> {
        match *self {
            FieldRule::MinChars { min, message } => {
                if value.chars().count() >= min {
                    Ok(())
                } else {
                    Err(message)
                }
            }
            FieldRule::Selected { message } => {
                if value.is_empty() {
                    Err(message)
                } else {
                    Ok(())
                }
            }
            FieldRule::IntRange {
                min,
                max,
                required,
                out_of_range,
            } => {
                if value.is_empty() {
                    return Err(required);
                }
                match value.trim().parse::<i64>() {
                    Ok(n) if (min..=max).contains(&n) => Ok(()),
                    _ => Err(out_of_range),
                }
            }
        }
    }
}

/// A field together with its display label and rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field: Field,
    pub label: &'static str,
    pub rule: FieldRule,
}

impl FieldDescriptor {
    pub fn check(&self, form: &FormData) -> Result<(), &'static str> {
        self.rule.check(form.value(self.field))
    }
}

pub static PERSONAL_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        field: Field::Name,
        label: "Full Name",
        rule: FieldRule::MinChars {
            min: 2,
            message: "Name must be at least 2 characters",
        },
    },
    FieldDescriptor {
        field: Field::Gender,
        label: "Gender",
        rule: FieldRule::Selected {
            message: "Please select your gender",
        },
    },
];

pub static BIRTH_INFO_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        field: Field::Day,
        label: "Day",
        rule: FieldRule::IntRange {
            min: 1,
            max: 31,
            required: "Day is required",
            out_of_range: "Day must be between 1 and 31",
        },
    },
    FieldDescriptor {
        field: Field::Month,
        label: "Month",
        rule: FieldRule::IntRange {
            min: 1,
            max: 12,
            required: "Month is required",
            out_of_range: "Month must be between 1 and 12",
        },
    },
    FieldDescriptor {
        field: Field::Year,
        label: "Year",
        rule: FieldRule::IntRange {
            min: 1900,
            max: 2030,
            required: "Year is required",
            out_of_range: "Year must be between 1900 and 2030",
        },
    },
    FieldDescriptor {
        field: Field::Hour,
        label: "Hour (24h)",
        rule: FieldRule::IntRange {
            min: 0,
            max: 23,
            required: "Hour is required",
            out_of_range: "Hour must be between 0 and 23",
        },
    },
    FieldDescriptor {
        field: Field::Minute,
        label: "Minutes",
        rule: FieldRule::IntRange {
            min: 0,
            max: 59,
            required: "Minutes are required",
            out_of_range: "Minutes must be between 0 and 59",
        },
    },
    FieldDescriptor {
        field: Field::Place,
        label: "Birth Place",
        rule: FieldRule::MinChars {
            min: 3,
            message: "Place must be at least 3 characters",
        },
    },
];

/// Looks up the descriptor for a field across all steps.
pub fn descriptor_for(field: Field) -> Option<&'static FieldDescriptor> {
    Step::ALL
        .iter()
        .flat_map(|step| step.fields().iter())
        .find(|descriptor| descriptor.field == field)
}

/// Per-field failure messages, kept in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<(Field, &'static str)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn invalid_fields(&self) -> Vec<Field> {
        self.errors.iter().map(|(field, _)| *field).collect()
    }

    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| *message)
    }

    pub fn errors(&self) -> &[(Field, &'static str)] {
        &self.errors
    }

    /// Records or replaces the message for a field, keeping field order.
    pub fn insert(&mut self, field: Field, message: &'static str) {
        match self.errors.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = message,
            None => {
                self.errors.push((field, message));
                self.errors.sort_by_key(|(f, _)| *f);
            }
        }
    }

    pub fn remove(&mut self, field: Field) {
        self.errors.retain(|(f, _)| *f != field);
    }

    pub fn merge(&mut self, other: ValidationReport) {
        for (field, message) in other.errors {
            self.insert(field, message);
        }
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

/// Validates the fields a step gates on.
pub fn validate_step(step: Step, form: &FormData) -> ValidationReport {
    let mut report = ValidationReport::default();
    for descriptor in step.fields() {
        if let Err(message) = descriptor.check(form) {
            report.insert(descriptor.field, message);
        }
    }
    report
}

/// Validates every step, as required before submission.
pub fn validate_all(form: &FormData) -> ValidationReport {
    let mut report = ValidationReport::default();
    for step in Step::ALL {
        report.merge(validate_step(step, form));
    }
    report
}

/// Required fields of a step that have no value at all.
pub fn missing_fields(step: Step, form: &FormData) -> Vec<Field> {
    step.fields()
        .iter()
        .map(|descriptor| descriptor.field)
        .filter(|field| form.value(*field).is_empty())
        .collect()
}
