use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Raw image bytes tagged with their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// File extension matching the media type, `bin` when unknown.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            "image/heif" => "heif",
            _ => "bin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Father,
    Mother,
    Together,
}

/// Age labels attached to a photo. Blank labels are stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgeAnnotation {
    /// One subject per photo (father or mother collection).
    Single(Option<String>),
    /// Both subjects in one photo.
    Pair {
        father: Option<String>,
        mother: Option<String>,
    },
}

impl AgeAnnotation {
    pub fn for_collection(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::Father | CollectionKind::Mother => AgeAnnotation::Single(None),
            CollectionKind::Together => AgeAnnotation::Pair {
                father: None,
                mother: None,
            },
        }
    }

    pub fn single(&self) -> Option<&str> {
        match self {
            AgeAnnotation::Single(age) => age.as_deref(),
            AgeAnnotation::Pair { .. } => None,
        }
    }

    pub fn father(&self) -> Option<&str> {
        match self {
            AgeAnnotation::Pair { father, .. } => father.as_deref(),
            AgeAnnotation::Single(_) => None,
        }
    }

    pub fn mother(&self) -> Option<&str> {
        match self {
            AgeAnnotation::Pair { mother, .. } => mother.as_deref(),
            AgeAnnotation::Single(_) => None,
        }
    }
}

pub(crate) fn normalize_label(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedImage {
    pub id: String,
    pub payload: ImagePayload,
    pub ages: AgeAnnotation,
}

impl AnnotatedImage {
    pub fn new(id: impl Into<String>, payload: ImagePayload, ages: AgeAnnotation) -> Self {
        Self {
            id: id.into(),
            payload,
            ages,
        }
    }

    /// Photo of a single subject, aged `age` when taken.
    pub fn single(id: impl Into<String>, payload: ImagePayload, age: Option<&str>) -> Self {
        Self::new(
            id,
            payload,
            AgeAnnotation::Single(normalize_label(age.map(String::from))),
        )
    }

    /// Photo showing both subjects together.
    pub fn pair(
        id: impl Into<String>,
        payload: ImagePayload,
        father_age: Option<&str>,
        mother_age: Option<&str>,
    ) -> Self {
        Self::new(
            id,
            payload,
            AgeAnnotation::Pair {
                father: normalize_label(father_age.map(String::from)),
                mother: normalize_label(mother_age.map(String::from)),
            },
        )
    }
}

/// Photos for exactly one collection mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectImages {
    Separate {
        father: Vec<AnnotatedImage>,
        mother: Vec<AnnotatedImage>,
    },
    Together(Vec<AnnotatedImage>),
}

impl SubjectImages {
    /// Whether the collections required by this mode all hold at least one photo.
    pub fn is_complete(&self) -> bool {
        match self {
            SubjectImages::Separate { father, mother } => !father.is_empty() && !mother.is_empty(),
            SubjectImages::Together(images) => !images.is_empty(),
        }
    }

    pub fn image_count(&self) -> usize {
        match self {
            SubjectImages::Separate { father, mother } => father.len() + mother.len(),
            SubjectImages::Together(images) => images.len(),
        }
    }
}
