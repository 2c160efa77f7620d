use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{BlendConfiguration, SubjectImages};

pub const MAX_FIXED_AGE_IMAGES: u8 = 4;
pub const MAX_IMAGES_PER_PROGRESSION_AGE: u8 = 2;

/// Ages offered for age progression runs.
pub const PRESET_AGES: [&str; 7] = [
    "3 months old",
    "6 months old",
    "1 year old",
    "2 years old",
    "3 years old",
    "4 years old",
    "5 years old",
];

/// Ages offered for a fixed-age run, besides a custom age.
pub const FIXED_AGE_PRESETS: [&str; 3] = ["Newborn", "1 year old", "2 years old"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    Male,
    #[default]
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("Male"),
            Gender::Female => f.write_str("Female"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParentDetails {
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

impl ParentDetails {
    pub fn ethnicity(&self) -> Option<&str> {
        self.ethnicity.as_deref().filter(|v| !v.is_empty())
    }

    pub fn nationality(&self) -> Option<&str> {
        self.nationality.as_deref().filter(|v| !v.is_empty())
    }
}

/// Everything the prompt needs except the photos themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildProfile {
    pub parents: ParentDetails,
    /// Counts from 1, so no profile can describe a "0th" child.
    pub child_number: NonZeroU32,
    pub gender: Gender,
    pub blend: BlendConfiguration,
}

/// One call batch against the generation API: a single target age.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub subjects: Arc<SubjectImages>,
    pub profile: ChildProfile,
    pub age: String,
    pub number_of_images: u8,
}

/// The age of a fixed-age run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedAge {
    Preset(String),
    /// Whole years.
    Custom(u32),
}

impl FixedAge {
    pub fn label(&self) -> String {
        match self {
            FixedAge::Preset(label) => label.clone(),
            FixedAge::Custom(years) => format!("{} years old", years),
        }
    }
}

impl Default for FixedAge {
    fn default() -> Self {
        FixedAge::Preset(FIXED_AGE_PRESETS[0].to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMode {
    FixedAge { age: FixedAge, images: u8 },
    AgeProgression { ages: Vec<String>, images_per_age: u8 },
}

impl GenerationMode {
    /// Fixed-age mode; `images` is clamped to 1–4.
    pub fn fixed_age(age: FixedAge, images: u8) -> Self {
        GenerationMode::FixedAge {
            age,
            images: images.clamp(1, MAX_FIXED_AGE_IMAGES),
        }
    }

    /// Age progression in the given order; `images_per_age` is clamped to 1–2.
    pub fn age_progression(ages: Vec<String>, images_per_age: u8) -> Self {
        GenerationMode::AgeProgression {
            ages,
            images_per_age: images_per_age.clamp(1, MAX_IMAGES_PER_PROGRESSION_AGE),
        }
    }

    /// `(age label, image count)` for every batch of the run, in order.
    /// Counts are clamped here too, so a mode built from its variants
    /// directly still issues a legal number of calls.
    pub fn batches(&self) -> Vec<(String, u8)> {
        match self {
            GenerationMode::FixedAge { age, images } => {
                vec![(age.label(), (*images).clamp(1, MAX_FIXED_AGE_IMAGES))]
            }
            GenerationMode::AgeProgression {
                ages,
                images_per_age,
            } => {
                let count = (*images_per_age).clamp(1, MAX_IMAGES_PER_PROGRESSION_AGE);
                ages.iter().map(|age| (age.clone(), count)).collect()
            }
        }
    }
}

/// Immutable description of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub subjects: Arc<SubjectImages>,
    pub profile: ChildProfile,
    pub mode: GenerationMode,
}

impl GenerationRun {
    pub fn new(subjects: SubjectImages, profile: ChildProfile, mode: GenerationMode) -> Self {
        Self {
            subjects: Arc::new(subjects),
            profile,
            mode,
        }
    }

    pub fn request_for(&self, age: impl Into<String>, number_of_images: u8) -> GenerationRequest {
        GenerationRequest {
            subjects: Arc::clone(&self.subjects),
            profile: self.profile.clone(),
            age: age.into(),
            number_of_images,
        }
    }
}
