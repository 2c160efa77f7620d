//! JSON job manifests for the command-line front end.
//!
//! ```json
//! {
//!   "input_mode": "separate",
//!   "father": [{ "path": "dad-30.jpg", "age": "30" }],
//!   "mother": [{ "path": "mom-28.jpg", "age": "28" }],
//!   "nationality": "Korean",
//!   "gender": "Female",
//!   "blend": { "simple": { "mom": 70 } },
//!   "generation": { "mode": "fixed_age", "age": "Newborn", "count": 2 },
//!   "output_dir": "out"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    error::{BabyFaceError, Result},
    models::{BlendConfiguration, CollectionKind, FixedAge, Gender, ParentDetails, PRESET_AGES},
    session::{GenerationKind, InputMode, PhotoCollection, Session},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobInputMode {
    #[default]
    Separate,
    Together,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhotoEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub father_age: Option<String>,
    #[serde(default)]
    pub mother_age: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum JobGeneration {
    FixedAge {
        #[serde(default)]
        age: Option<String>,
        /// Whole years; takes precedence over `age`.
        #[serde(default)]
        custom_age: Option<u32>,
        #[serde(default = "one")]
        count: u8,
    },
    AgeProgression {
        ages: Vec<String>,
        #[serde(default = "one")]
        count_per_age: u8,
    },
}

fn one() -> u8 {
    1
}

fn first_child() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobManifest {
    #[serde(default)]
    pub input_mode: JobInputMode,
    #[serde(default)]
    pub father: Vec<PhotoEntry>,
    #[serde(default)]
    pub mother: Vec<PhotoEntry>,
    #[serde(default)]
    pub together: Vec<PhotoEntry>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default = "first_child")]
    pub child_number: u32,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub blend: BlendConfiguration,
    pub generation: JobGeneration,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl JobManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BabyFaceError::input(format!("Invalid job manifest: {}", e)))
    }

    /// Reads a manifest. Relative photo and output paths resolve against its directory.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let mut manifest = Self::from_json(&json)?;

        if let Some(base) = path.parent() {
            manifest.resolve_paths(base);
        }
        Ok(manifest)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for entry in self
            .father
            .iter_mut()
            .chain(self.mother.iter_mut())
            .chain(self.together.iter_mut())
        {
            resolve(&mut entry.path);
        }
        if let Some(dir) = self.output_dir.as_mut() {
            resolve(dir);
        }
    }

    /// Uploads the photos of the active input mode and fills in the form.
    pub async fn into_session(self) -> Result<Session> {
        let mut session = Session::new();
        session.input_mode = match self.input_mode {
            JobInputMode::Separate => InputMode::Separate,
            JobInputMode::Together => InputMode::Together,
        };

        match session.input_mode {
            InputMode::Separate => {
                upload(&mut session.father, &self.father).await?;
                upload(&mut session.mother, &self.mother).await?;
            }
            InputMode::Together => upload(&mut session.together, &self.together).await?,
        }

        session.parents = ParentDetails {
            ethnicity: self.ethnicity,
            nationality: self.nationality,
        };
        session.set_child_number(self.child_number);
        session.gender = self.gender;
        session.blend = self.blend;

        match self.generation {
            JobGeneration::FixedAge {
                age,
                custom_age,
                count,
            } => {
                session.generation = GenerationKind::FixedAge;
                session.fixed_age = match (custom_age, age) {
                    (Some(years), _) => FixedAge::Custom(years),
                    (None, Some(label)) => FixedAge::Preset(label),
                    (None, None) => FixedAge::default(),
                };
                session.fixed_age_images = count;
            }
            JobGeneration::AgeProgression {
                ages,
                count_per_age,
            } => {
                session.generation = GenerationKind::AgeProgression;
                for age in ages {
                    if !PRESET_AGES.contains(&age.as_str()) {
                        return Err(BabyFaceError::input(format!(
                            "'{}' is not one of the progression ages: {}",
                            age,
                            PRESET_AGES.join(", ")
                        )));
                    }
                    if !session.progression_ages.contains(&age) {
                        session.progression_ages.toggle(&age);
                    }
                }
                session.images_per_age = count_per_age;
            }
        }

        Ok(session)
    }
}

async fn upload(collection: &mut PhotoCollection, entries: &[PhotoEntry]) -> Result<()> {
    for entry in entries {
        let id = collection.add_file(&entry.path).await?;
        match collection.kind() {
            CollectionKind::Together => {
                collection.set_father_age(&id, entry.father_age.as_deref())?;
                collection.set_mother_age(&id, entry.mother_age.as_deref())?;
            }
            CollectionKind::Father | CollectionKind::Mother => {
                collection.set_age(&id, entry.age.as_deref())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GenerationMode, SubjectImages};

    #[tokio::test]
    async fn loads_a_together_progression_job() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("both.jpg"), [1u8, 2, 3]).unwrap();
        let manifest_path = dir.path().join("job.json");
        std::fs::write(
            &manifest_path,
            r#"{
                "input_mode": "together",
                "together": [{ "path": "both.jpg", "father_age": "30" }],
                "gender": "Male",
                "child_number": 2,
                "blend": { "detailed": { "eyes": { "mom": 80 } } },
                "generation": {
                    "mode": "age_progression",
                    "ages": ["2 years old", "6 months old", "2 years old"],
                    "count_per_age": 5
                },
                "output_dir": "out"
            }"#,
        )
        .unwrap();

        let manifest = JobManifest::load(&manifest_path).await.unwrap();
        assert_eq!(manifest.output_dir, Some(dir.path().join("out")));

        let run = manifest.into_session().await.unwrap().to_run().unwrap();
        match &*run.subjects {
            SubjectImages::Together(images) => {
                assert_eq!(images.len(), 1);
                assert_eq!(images[0].ages.father(), Some("30"));
                assert_eq!(images[0].ages.mother(), None);
            }
            other => panic!("unexpected subjects: {:?}", other),
        }
        assert_eq!(
            run.mode,
            GenerationMode::AgeProgression {
                ages: vec!["2 years old".into(), "6 months old".into()],
                images_per_age: 2
            }
        );
        assert_eq!(run.profile.gender, Gender::Male);
        assert_eq!(run.profile.child_number.get(), 2);
    }

    #[tokio::test]
    async fn custom_age_wins_over_preset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dad.png"), [1u8]).unwrap();
        std::fs::write(dir.path().join("mom.png"), [2u8]).unwrap();
        let mut manifest = JobManifest::from_json(
            r#"{
                "father": [{ "path": "dad.png", "age": "31" }],
                "mother": [{ "path": "mom.png" }],
                "generation": { "mode": "fixed_age", "age": "Newborn", "custom_age": 6, "count": 3 }
            }"#,
        )
        .unwrap();
        manifest.resolve_paths(dir.path());

        let run = manifest.into_session().await.unwrap().to_run().unwrap();
        assert_eq!(run.mode.batches(), vec![("6 years old".to_string(), 3)]);
    }

    #[tokio::test]
    async fn rejects_ages_outside_the_presets() {
        let manifest = JobManifest::from_json(
            r#"{ "generation": { "mode": "age_progression", "ages": ["17 years old"] } }"#,
        )
        .unwrap();
        assert!(manifest.into_session().await.unwrap_err().is_input());
    }

    #[test]
    fn custom_age_must_be_whole_years() {
        for bad in ["\"\"", "\"abc\"", "-3", "4.5"] {
            let json = format!(
                r#"{{ "generation": {{ "mode": "fixed_age", "custom_age": {} }} }}"#,
                bad
            );
            assert!(JobManifest::from_json(&json).unwrap_err().is_input(), "{}", bad);
        }
    }

    #[test]
    fn unknown_fields_are_reported() {
        let err = JobManifest::from_json(r#"{ "generation": { "mode": "fixed_age" }, "colour": 1 }"#)
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid job manifest"));
    }
}
