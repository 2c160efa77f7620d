//! Form state a front end keeps while the user prepares a run: photo
//! collections, age choices, blend and child details. `Session::to_run`
//! turns it into an immutable [`GenerationRun`].

use std::num::NonZeroU32;
use std::path::Path;

use uuid::Uuid;

use crate::{
    error::{BabyFaceError, Result},
    models::{
        image::normalize_label,
        AgeAnnotation, AnnotatedImage, BlendConfiguration, ChildProfile,
        CollectionKind, FixedAge, Gender, GenerationMode, GenerationRun, ImagePayload,
        ParentDetails, SubjectImages,
    },
    orchestrator::{Orchestrator, MISSING_REQUIRED_PHOTOS},
};

/// Media type for an image file, from its extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Reads an image file. Files that are not images are rejected.
pub async fn read_image(path: impl AsRef<Path>) -> Result<ImagePayload> {
    let path = path.as_ref();
    let mime = mime_for_path(path).ok_or_else(|| {
        BabyFaceError::input(format!("{} is not a supported image file", path.display()))
    })?;
    let data = tokio::fs::read(path).await?;
    if data.is_empty() {
        return Err(BabyFaceError::input(format!("{} is empty", path.display())));
    }
    Ok(ImagePayload::new(mime, data))
}

/// Photos of one collection, in upload order.
#[derive(Debug, Clone)]
pub struct PhotoCollection {
    kind: CollectionKind,
    images: Vec<AnnotatedImage>,
}

impl PhotoCollection {
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            images: Vec::new(),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Reads `path` and appends it once the read completes. Returns the new id.
    pub async fn add_file(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let payload = read_image(path.as_ref()).await?;
        log::debug!(
            "Added {} to the {:?} photos ({} bytes)",
            path.as_ref().display(),
            self.kind,
            payload.data.len()
        );
        Ok(self.add_payload(payload))
    }

    pub fn add_bytes(&mut self, data: Vec<u8>, mime_type: &str) -> Result<String> {
        if !mime_type.starts_with("image/") {
            return Err(BabyFaceError::input(format!(
                "{} is not an image media type",
                mime_type
            )));
        }
        Ok(self.add_payload(ImagePayload::new(mime_type, data)))
    }

    fn add_payload(&mut self, payload: ImagePayload) -> String {
        let id = Uuid::new_v4().to_string();
        self.images.push(AnnotatedImage::new(
            id.clone(),
            payload,
            AgeAnnotation::for_collection(self.kind),
        ));
        id
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut AnnotatedImage> {
        self.images
            .iter_mut()
            .find(|image| image.id == id)
            .ok_or_else(|| BabyFaceError::input(format!("No photo with id {}", id)))
    }

    /// Age of the single subject in a father or mother photo.
    pub fn set_age(&mut self, id: &str, age: Option<&str>) -> Result<()> {
        let image = self.find_mut(id)?;
        match &mut image.ages {
            AgeAnnotation::Single(current) => {
                *current = normalize_label(age.map(String::from));
                Ok(())
            }
            AgeAnnotation::Pair { .. } => Err(BabyFaceError::input(
                "Photos taken together carry separate father and mother ages",
            )),
        }
    }

    pub fn set_father_age(&mut self, id: &str, age: Option<&str>) -> Result<()> {
        self.set_pair_age(id, age, true)
    }

    pub fn set_mother_age(&mut self, id: &str, age: Option<&str>) -> Result<()> {
        self.set_pair_age(id, age, false)
    }

    fn set_pair_age(&mut self, id: &str, age: Option<&str>, is_father: bool) -> Result<()> {
        let image = self.find_mut(id)?;
        match &mut image.ages {
            AgeAnnotation::Pair { father, mother } => {
                let slot = if is_father { father } else { mother };
                *slot = normalize_label(age.map(String::from));
                Ok(())
            }
            AgeAnnotation::Single(_) => Err(BabyFaceError::input(
                "Father and mother ages only apply to photos taken together",
            )),
        }
    }

    /// Returns whether a photo was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|image| image.id != id);
        self.images.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&AnnotatedImage> {
        self.images.iter().find(|image| image.id == id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedImage> {
        self.images.iter()
    }

    pub fn to_vec(&self) -> Vec<AnnotatedImage> {
        self.images.clone()
    }
}

/// Ages picked for a progression run, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgeSelection {
    ages: Vec<String>,
}

impl AgeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `age` at the end, or removes it if already selected.
    pub fn toggle(&mut self, age: &str) {
        if let Some(position) = self.ages.iter().position(|selected| selected == age) {
            self.ages.remove(position);
        } else {
            self.ages.push(age.to_string());
        }
    }

    pub fn contains(&self, age: &str) -> bool {
        self.ages.iter().any(|selected| selected == age)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ages
    }

    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Separate,
    Together,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationKind {
    #[default]
    FixedAge,
    AgeProgression,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub input_mode: InputMode,
    pub father: PhotoCollection,
    pub mother: PhotoCollection,
    pub together: PhotoCollection,
    pub parents: ParentDetails,
    child_number: NonZeroU32,
    pub gender: Gender,
    pub blend: BlendConfiguration,
    pub generation: GenerationKind,
    pub fixed_age: FixedAge,
    pub fixed_age_images: u8,
    pub progression_ages: AgeSelection,
    pub images_per_age: u8,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            input_mode: InputMode::default(),
            father: PhotoCollection::new(CollectionKind::Father),
            mother: PhotoCollection::new(CollectionKind::Mother),
            together: PhotoCollection::new(CollectionKind::Together),
            parents: ParentDetails::default(),
            child_number: NonZeroU32::MIN,
            gender: Gender::default(),
            blend: BlendConfiguration::default(),
            generation: GenerationKind::default(),
            fixed_age: FixedAge::default(),
            fixed_age_images: 1,
            progression_ages: AgeSelection::new(),
            images_per_age: 1,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection_mut(&mut self, kind: CollectionKind) -> &mut PhotoCollection {
        match kind {
            CollectionKind::Father => &mut self.father,
            CollectionKind::Mother => &mut self.mother,
            CollectionKind::Together => &mut self.together,
        }
    }

    pub fn child_number(&self) -> u32 {
        self.child_number.get()
    }

    /// Child numbers start at 1; lower values are raised to 1.
    pub fn set_child_number(&mut self, child_number: u32) {
        self.child_number = NonZeroU32::new(child_number).unwrap_or(NonZeroU32::MIN);
    }

    pub fn has_required_photos(&self) -> bool {
        match self.input_mode {
            InputMode::Separate => !self.father.is_empty() && !self.mother.is_empty(),
            InputMode::Together => !self.together.is_empty(),
        }
    }

    /// Whether a run could start right now.
    pub fn can_generate(&self) -> bool {
        self.has_required_photos()
            && (self.generation == GenerationKind::FixedAge || !self.progression_ages.is_empty())
    }

    pub fn subjects(&self) -> SubjectImages {
        match self.input_mode {
            InputMode::Separate => SubjectImages::Separate {
                father: self.father.to_vec(),
                mother: self.mother.to_vec(),
            },
            InputMode::Together => SubjectImages::Together(self.together.to_vec()),
        }
    }

    /// Snapshot of the current form as a validated run. Only the active
    /// input mode's photos are included.
    pub fn to_run(&self) -> Result<GenerationRun> {
        if !self.has_required_photos() {
            return Err(BabyFaceError::input(MISSING_REQUIRED_PHOTOS));
        }

        let mode = match self.generation {
            GenerationKind::FixedAge => {
                GenerationMode::fixed_age(self.fixed_age.clone(), self.fixed_age_images)
            }
            GenerationKind::AgeProgression => GenerationMode::age_progression(
                self.progression_ages.as_slice().to_vec(),
                self.images_per_age,
            ),
        };

        let profile = ChildProfile {
            parents: self.parents.clone(),
            child_number: self.child_number,
            gender: self.gender,
            blend: self.blend.clone(),
        };

        let run = GenerationRun::new(self.subjects(), profile, mode);
        Orchestrator::validate(&run)?;
        Ok(run)
    }
}
