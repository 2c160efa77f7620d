//! Lays out the photos, their age notes and the instruction as request parts.

use crate::error::{BabyFaceError, Result};
use crate::models::{AnnotatedImage, Part, SubjectImages};

pub const MISSING_PHOTOS: &str = "You must provide photos for the selected mode.";

pub fn together_caption(image: &AnnotatedImage) -> String {
    let mut caption = String::from("This photo contains both the father and mother");
    match (image.ages.father(), image.ages.mother()) {
        (Some(father), Some(mother)) => caption.push_str(&format!(
            ", taken when the father was around age {} and the mother was around age {}.",
            father, mother
        )),
        (Some(father), None) => caption.push_str(&format!(
            ", taken when the father was around age {}.",
            father
        )),
        (None, Some(mother)) => caption.push_str(&format!(
            ", taken when the mother was around age {}.",
            mother
        )),
        (None, None) => caption.push('.'),
    }
    caption
}

pub fn subject_caption(subject: &str, image: &AnnotatedImage) -> String {
    format!(
        "This is the {} at age {}.",
        subject,
        image.ages.single().unwrap_or("unknown")
    )
}

/// Attachment/caption pairs for every photo, then the instruction last.
pub fn assemble_parts(subjects: &SubjectImages, instruction: &str) -> Result<Vec<Part>> {
    if !subjects.is_complete() {
        return Err(BabyFaceError::input(MISSING_PHOTOS));
    }

    let mut parts = Vec::with_capacity(subjects.image_count() * 2 + 1);
    match subjects {
        SubjectImages::Together(images) => {
            for image in images {
                parts.push(Part::image(&image.payload));
                parts.push(Part::text(together_caption(image)));
            }
        }
        SubjectImages::Separate { father, mother } => {
            for image in father {
                parts.push(Part::image(&image.payload));
                parts.push(Part::text(subject_caption("father", image)));
            }
            for image in mother {
                parts.push(Part::image(&image.payload));
                parts.push(Part::text(subject_caption("mother", image)));
            }
        }
    }
    parts.push(Part::text(instruction));

    Ok(parts)
}
