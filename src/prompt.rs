//! Compiles a child profile and target age into the instruction text sent
//! after the photos.

use crate::models::{BlendConfiguration, ChildProfile, FacialFeature, GenerationRequest};

const OPENING: &str = "Analyze the provided photos of a father and a mother, taken at various ages. \
Based on all their facial features across these different life stages, \
generate a highly realistic portrait of their child.";

const DETAILED_INTRO: &str = "Create the child's face by combining the parents' features \
with the following specific percentages for each facial area:\n";

const CLOSING: &str = "\nSynthesize all this information to create a cohesive and natural-looking \
portrait of the child as described. Do not include any text, labels, or annotations on the \
image itself. The output should be only the child's face.";

/// English-ish ordinal for the child number. Only 1, 2 and 3 get special
/// suffixes, so 11 renders as "11th" and 22 as "22th".
pub fn ordinal(n: u32) -> String {
    match n {
        1 => "1st".to_string(),
        2 => "2nd".to_string(),
        3 => "3rd".to_string(),
        n => format!("{}th", n),
    }
}

pub fn build_prompt(request: &GenerationRequest) -> String {
    compile(&request.profile, &request.age)
}

pub fn compile(profile: &ChildProfile, age: &str) -> String {
    let mut prompt = String::from(OPENING);

    let mut parent_details = Vec::new();
    if let Some(ethnicity) = profile.parents.ethnicity() {
        parent_details.push(format!("- **Ethnicity/Race:** {}", ethnicity));
    }
    if let Some(nationality) = profile.parents.nationality() {
        parent_details.push(format!("- **Nationality:** {}", nationality));
    }
    if !parent_details.is_empty() {
        prompt.push_str("\n\n**Parent's Details:**\n");
        prompt.push_str(&parent_details.join("\n"));
    }

    prompt.push_str(&format!(
        "\n\n**Child's Details:**\n\
         - **Gender:** {}\n\
         - **Age:** {}\n\
         - **This is their:** {} child.\n\n\
         **Resemblance Instructions:**\n",
        profile.gender,
        age,
        ordinal(profile.child_number.get())
    ));

    match &profile.blend {
        BlendConfiguration::Simple(ratio) => {
            prompt.push_str(&format!(
                "- The child should have an overall resemblance of **{}% to the mother** and \
                 **{}% to the father**. Blend their features accordingly to achieve this overall mix.",
                ratio.mom(),
                ratio.dad()
            ));
        }
        BlendConfiguration::Detailed(ratios) => {
            prompt.push_str(DETAILED_INTRO);
            for feature in FacialFeature::ALL {
                // Features without an entry are left to the model.
                if let Some(ratio) = ratios.get(&feature) {
                    prompt.push_str(&format!(
                        "- **{}:** {}% Mother's features, {}% Father's features.\n",
                        feature.label(),
                        ratio.mom(),
                        ratio.dad()
                    ));
                }
            }
        }
    }

    prompt.push_str(CLOSING);
    prompt
}
