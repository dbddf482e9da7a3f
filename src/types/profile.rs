//! types/profile.rs
//!
//! The user profile collected before monitoring. Every field is optional at
//! submission time; missing values render as "N/A".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const DEFAULT_NAME: &str = "User";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(s)
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("unknown gender: {}", s)),
        }
    }
}

/// Profile submitted once per run and shown alongside the live readings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub height_cm: Option<f32>,
    pub weight_kg: Option<f32>,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
}

impl UserProfile {
    /// Create a profile; a blank name becomes "User".
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        Self {
            name: if name.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                name.to_string()
            },
            height_cm: None,
            weight_kg: None,
            gender: None,
            age: None,
        }
    }

    pub fn with_height(mut self, height_cm: f32) -> Self {
        self.height_cm = Some(height_cm);
        self
    }

    pub fn with_weight(mut self, weight_kg: f32) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn height_label(&self) -> String {
        label(self.height_cm)
    }

    pub fn weight_label(&self) -> String {
        label(self.weight_kg)
    }

    pub fn gender_label(&self) -> String {
        label(self.gender)
    }

    pub fn age_label(&self) -> String {
        label(self.age)
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

fn label<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}
