use serde::{Deserialize, Serialize};
use std::fmt;

use super::validation::{FieldDescriptor, BIRTH_INFO_FIELDS, PERSONAL_FIELDS};

/// Gender options offered by the personal-info step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    /// Cycles forward through the options, starting at `Male` when nothing is selected.
    pub fn cycle_next(current: Option<Gender>) -> Gender {
        match current {
            None | Some(Gender::Other) => Gender::Male,
            Some(Gender::Male) => Gender::Female,
            Some(Gender::Female) => Gender::Other,
        }
    }

    /// Cycles backward through the options, starting at `Other` when nothing is selected.
    pub fn cycle_prev(current: Option<Gender>) -> Gender {
        match current {
            None | Some(Gender::Male) => Gender::Other,
            Some(Gender::Female) => Gender::Male,
            Some(Gender::Other) => Gender::Female,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a single answer in [`FormData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Gender,
    Day,
    Month,
    Year,
    Hour,
    Minute,
    Place,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Gender,
        Field::Day,
        Field::Month,
        Field::Year,
        Field::Hour,
        Field::Minute,
        Field::Place,
    ];

    /// The key used for this field in persisted and submitted JSON.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Gender => "gender",
            Field::Day => "day",
            Field::Month => "month",
            Field::Year => "year",
            Field::Hour => "hour",
            Field::Minute => "min",
            Field::Place => "place",
        }
    }

    /// The key with its first letter upper-cased, as used in "Please complete: ..." notices.
    pub fn capitalized_key(&self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Field::Day | Field::Month | Field::Year | Field::Hour | Field::Minute
        )
    }
}

/// The answers collected by the form.
///
/// Numeric answers are kept as the strings the user typed so that partially
/// entered values survive autosave unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    pub day: String,
    pub month: String,
    pub year: String,
    pub hour: String,
    pub min: String,
    pub place: String,
}

impl FormData {
    /// Returns the textual value of a field. An unselected gender reads as `""`.
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Gender => self.gender.map(|g| g.as_str()).unwrap_or(""),
            Field::Day => &self.day,
            Field::Month => &self.month,
            Field::Year => &self.year,
            Field::Hour => &self.hour,
            Field::Minute => &self.min,
            Field::Place => &self.place,
        }
    }

    /// Sets the textual value of a field.
    ///
    /// For `Gender`, unknown strings clear the selection.
    pub fn set_value(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Gender => {
                self.gender = Gender::ALL
                    .into_iter()
                    .find(|g| g.as_str() == value.trim().to_lowercase());
            }
            Field::Day => self.day = value,
            Field::Month => self.month = value,
            Field::Year => self.year = value,
            Field::Hour => self.hour = value,
            Field::Minute => self.min = value,
            Field::Place => self.place = value,
        }
    }

    /// True when no answer has been given at all.
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|field| self.value(*field).is_empty())
    }

    /// Birth date as `DD/MM/YYYY`, zero-padding day and month.
    pub fn birth_date_display(&self) -> String {
        format!("{:0>2}/{:0>2}/{}", self.day, self.month, self.year)
    }

    /// Birth time as `HH:MM`, zero-padding both parts.
    pub fn birth_time_display(&self) -> String {
        format!("{:0>2}:{:0>2}", self.hour, self.min)
    }
}

/// One page of the multi-part form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    #[default]
    Personal,
    BirthInfo,
    Review,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Personal, Step::BirthInfo, Step::Review];

    pub fn number(&self) -> u8 {
        match self {
            Step::Personal => 1,
            Step::BirthInfo => 2,
            Step::Review => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Step> {
        match number {
            1 => Some(Step::Personal),
            2 => Some(Step::BirthInfo),
            3 => Some(Step::Review),
            _ => None,
        }
    }

    /// The following step, or `None` from the last one.
    pub fn following(&self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    /// The preceding step, or `None` from the first one.
    pub fn preceding(&self) -> Option<Step> {
        Step::from_number(self.number() - 1)
    }

    pub fn is_last(&self) -> bool {
        self.following().is_none()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Personal => "Personal",
            Step::BirthInfo => "Birth Info",
            Step::Review => "Review",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Step::Personal => "Who are you?",
            Step::BirthInfo => "When & where?",
            Step::Review => "All set?",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Step::Personal => "Tell us about yourself so we can create your personalized chart",
            Step::BirthInfo => "Your exact birth details help us map the cosmic alignment",
            Step::Review => "Let's confirm everything looks perfect before we generate your chart",
        }
    }

    /// The fields this step gates on, in display order. Review has none.
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        match self {
            Step::Personal => PERSONAL_FIELDS,
            Step::BirthInfo => BIRTH_INFO_FIELDS,
            Step::Review => &[],
        }
    }
}
