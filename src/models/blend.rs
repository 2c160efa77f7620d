use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BabyFaceError;

/// Facial regions a detailed blend can weight. Declaration order is the
/// order features are listed in prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FacialFeature {
    Forehead,
    Eyebrows,
    Glabella,
    Eyes,
    UnderEyes,
    Temples,
    Nose,
    NasolabialArea,
    Cheeks,
    Cheekbones,
    Mouth,
    Jawline,
    Ears,
}

impl FacialFeature {
    pub const ALL: [FacialFeature; 13] = [
        FacialFeature::Forehead,
        FacialFeature::Eyebrows,
        FacialFeature::Glabella,
        FacialFeature::Eyes,
        FacialFeature::UnderEyes,
        FacialFeature::Temples,
        FacialFeature::Nose,
        FacialFeature::NasolabialArea,
        FacialFeature::Cheeks,
        FacialFeature::Cheekbones,
        FacialFeature::Mouth,
        FacialFeature::Jawline,
        FacialFeature::Ears,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FacialFeature::Forehead => "forehead",
            FacialFeature::Eyebrows => "eyebrows",
            FacialFeature::Glabella => "glabella",
            FacialFeature::Eyes => "eyes",
            FacialFeature::UnderEyes => "underEyes",
            FacialFeature::Temples => "temples",
            FacialFeature::Nose => "nose",
            FacialFeature::NasolabialArea => "nasolabialArea",
            FacialFeature::Cheeks => "cheeks",
            FacialFeature::Cheekbones => "cheekbones",
            FacialFeature::Mouth => "mouth",
            FacialFeature::Jawline => "jawline",
            FacialFeature::Ears => "ears",
        }
    }

    /// Human-readable name used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            FacialFeature::Forehead => "Forehead",
            FacialFeature::Eyebrows => "Eyebrows",
            FacialFeature::Glabella => "Glabella (between eyebrows)",
            FacialFeature::Eyes => "Eyes (shape, eyelids, color)",
            FacialFeature::UnderEyes => "Under-eye Area (Aegyo Sal)",
            FacialFeature::Temples => "Temples",
            FacialFeature::Nose => "Nose (bridge, tip, nostrils)",
            FacialFeature::NasolabialArea => "Nasolabial Area (sides of nose)",
            FacialFeature::Cheeks => "Cheeks",
            FacialFeature::Cheekbones => "Cheekbones",
            FacialFeature::Mouth => "Mouth (lips, philtrum, corners)",
            FacialFeature::Jawline => "Jawline and Chin",
            FacialFeature::Ears => "Ears",
        }
    }

    /// Label for a raw feature key, falling back to the key itself.
    pub fn label_for_key(key: &str) -> &str {
        match key.parse::<FacialFeature>() {
            Ok(feature) => feature.label(),
            Err(_) => key,
        }
    }
}

impl fmt::Display for FacialFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FacialFeature {
    type Err = BabyFaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FacialFeature::ALL
            .iter()
            .copied()
            .find(|feature| feature.key() == s)
            .ok_or_else(|| BabyFaceError::input(format!("Unknown facial feature: {}", s)))
    }
}

impl TryFrom<String> for FacialFeature {
    type Error = BabyFaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FacialFeature> for String {
    fn from(feature: FacialFeature) -> Self {
        feature.key().to_string()
    }
}

/// A mother/father split that always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRatio")]
pub struct FeatureRatio {
    mom: u8,
    dad: u8,
}

#[derive(Deserialize)]
struct RawRatio {
    mom: Option<u8>,
    dad: Option<u8>,
}

impl TryFrom<RawRatio> for FeatureRatio {
    type Error = BabyFaceError;

    fn try_from(raw: RawRatio) -> Result<Self, Self::Error> {
        match (raw.mom, raw.dad) {
            (Some(mom), Some(dad)) if u16::from(mom) + u16::from(dad) == 100 => {
                Ok(FeatureRatio { mom, dad })
            }
            (Some(mom), Some(dad)) => Err(BabyFaceError::input(format!(
                "Resemblance percentages must add up to 100 (got {}% mom, {}% dad)",
                mom, dad
            ))),
            (Some(mom), None) if mom <= 100 => Ok(FeatureRatio::from_mom(mom)),
            (None, Some(dad)) if dad <= 100 => Ok(FeatureRatio::from_dad(dad)),
            (None, None) => Ok(FeatureRatio::default()),
            _ => Err(BabyFaceError::input(
                "Resemblance percentages must be between 0 and 100",
            )),
        }
    }
}

impl Default for FeatureRatio {
    fn default() -> Self {
        FeatureRatio { mom: 50, dad: 50 }
    }
}

impl FeatureRatio {
    /// Values above 100 are clamped.
    pub fn from_mom(mom: u8) -> Self {
        let mom = mom.min(100);
        FeatureRatio { mom, dad: 100 - mom }
    }

    pub fn from_dad(dad: u8) -> Self {
        let dad = dad.min(100);
        FeatureRatio { mom: 100 - dad, dad }
    }

    pub fn mom(&self) -> u8 {
        self.mom
    }

    pub fn dad(&self) -> u8 {
        self.dad
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendConfiguration {
    Simple(FeatureRatio),
    Detailed(BTreeMap<FacialFeature, FeatureRatio>),
}

impl Default for BlendConfiguration {
    fn default() -> Self {
        BlendConfiguration::Simple(FeatureRatio::default())
    }
}

impl BlendConfiguration {
    pub fn simple(mom: u8) -> Self {
        BlendConfiguration::Simple(FeatureRatio::from_mom(mom))
    }

    /// Detailed blend with every feature at 50/50.
    pub fn detailed() -> Self {
        BlendConfiguration::Detailed(
            FacialFeature::ALL
                .iter()
                .map(|feature| (*feature, FeatureRatio::default()))
                .collect(),
        )
    }

    pub fn is_detailed(&self) -> bool {
        matches!(self, BlendConfiguration::Detailed(_))
    }

    /// Sets the overall mother share of a simple blend.
    pub fn set_overall_mom(&mut self, mom: u8) -> Result<(), BabyFaceError> {
        match self {
            BlendConfiguration::Simple(ratio) => {
                *ratio = FeatureRatio::from_mom(mom);
                Ok(())
            }
            BlendConfiguration::Detailed(_) => Err(BabyFaceError::input(
                "Overall resemblance only applies to a simple blend",
            )),
        }
    }

    pub fn set_feature_mom(&mut self, feature: FacialFeature, mom: u8) -> Result<(), BabyFaceError> {
        self.set_feature(feature, FeatureRatio::from_mom(mom))
    }

    pub fn set_feature_dad(&mut self, feature: FacialFeature, dad: u8) -> Result<(), BabyFaceError> {
        self.set_feature(feature, FeatureRatio::from_dad(dad))
    }

    fn set_feature(&mut self, feature: FacialFeature, ratio: FeatureRatio) -> Result<(), BabyFaceError> {
        match self {
            BlendConfiguration::Detailed(ratios) => {
                ratios.insert(feature, ratio);
                Ok(())
            }
            BlendConfiguration::Simple(_) => Err(BabyFaceError::input(
                "Per-feature resemblance only applies to a detailed blend",
            )),
        }
    }

    pub fn feature(&self, feature: FacialFeature) -> Option<FeatureRatio> {
        match self {
            BlendConfiguration::Detailed(ratios) => ratios.get(&feature).copied(),
            BlendConfiguration::Simple(_) => None,
        }
    }
}
