//! Controlled mechanism vocabulary and canonicalization.
//!
//! Maps noisy free-text mechanism mentions coming back from the reasoning
//! service onto a small, closed set of canonical tags. Matching is a
//! deliberately lossy, precision-over-recall filter: a dropped mention is
//! acceptable, a wrong bucket is not, because graph construction and
//! aggregation assume the vocabulary is exhaustive and disjoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mentions longer than this are treated as noise or hallucination.
const MAX_MENTION_LEN: usize = 64;

/// The closed set of canonical mechanism categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MechanismTag {
    #[serde(rename = "Immune dysregulation")]
    ImmuneDysregulation,
    #[serde(rename = "Mitochondrial impairment")]
    MitochondrialImpairment,
    #[serde(rename = "Vascular/Endothelial dysfunction")]
    VascularEndothelialDysfunction,
    #[serde(rename = "Autonomic dysfunction")]
    AutonomicDysfunction,
    #[serde(rename = "Oxidative stress/Redox imbalance")]
    OxidativeStress,
    #[serde(rename = "Viral/Immune trigger")]
    ViralTrigger,
    #[serde(rename = "Metabolic dysfunction")]
    MetabolicDysfunction,
}

impl MechanismTag {
    /// Human-readable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            MechanismTag::ImmuneDysregulation => "Immune dysregulation",
            MechanismTag::MitochondrialImpairment => "Mitochondrial impairment",
            MechanismTag::VascularEndothelialDysfunction => "Vascular/Endothelial dysfunction",
            MechanismTag::AutonomicDysfunction => "Autonomic dysfunction",
            MechanismTag::OxidativeStress => "Oxidative stress/Redox imbalance",
            MechanismTag::ViralTrigger => "Viral/Immune trigger",
            MechanismTag::MetabolicDysfunction => "Metabolic dysfunction",
        }
    }

    /// All tags in priority order (first match wins during canonicalization).
    pub fn all() -> &'static [MechanismTag] {
        &[
            MechanismTag::ImmuneDysregulation,
            MechanismTag::MitochondrialImpairment,
            MechanismTag::VascularEndothelialDysfunction,
            MechanismTag::AutonomicDysfunction,
            MechanismTag::OxidativeStress,
            MechanismTag::ViralTrigger,
            MechanismTag::MetabolicDysfunction,
        ]
    }

    /// Case-insensitive substring variants that map to this tag.
    fn variants(&self) -> &'static [&'static str] {
        match self {
            MechanismTag::ImmuneDysregulation => &[
                "immune dysfunction",
                "immune dysregulation",
                "t cell",
                "b cell",
                "nk cell",
                "autoimmun",
                "cytokine",
                "inflammation",
                "neuroinflammation",
            ],
            MechanismTag::MitochondrialImpairment => &[
                "mitochondria",
                "atp",
                "oxidative phosphorylation",
                "mitochondrial dysfunction",
                "energy metabolism",
            ],
            MechanismTag::VascularEndothelialDysfunction => &[
                "endothelial",
                "hypoperfusion",
                "vascular",
                "blood flow",
                "perfusion",
                "microcirculation",
                "microclot",
            ],
            MechanismTag::AutonomicDysfunction => &[
                "autonomic",
                "pots",
                "heart rate",
                "blood pressure",
                "orthostatic",
                "adrenergic",
            ],
            MechanismTag::OxidativeStress => &[
                "oxidative stress",
                "radical",
                "nitrosative",
                "redox",
            ],
            MechanismTag::ViralTrigger => &[
                "ebv",
                "epstein",
                "virus",
                "viral",
                "infection",
                "post-viral",
            ],
            MechanismTag::MetabolicDysfunction => &[
                "metabolism",
                "metabolic",
                "glucose",
                "lipid",
                "pyruvate",
                "lactate",
            ],
        }
    }
}

impl fmt::Display for MechanismTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a raw mechanism mention onto a canonical tag.
///
/// Lowercases the input, rejects overlong strings, then tests substring
/// membership against each tag's variant list in priority order. Returns
/// `None` when nothing matches; the caller must drop the mention rather
/// than inventing a category.
pub fn canonicalize(mention: &str) -> Option<MechanismTag> {
    let trimmed = mention.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_MENTION_LEN {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    for tag in MechanismTag::all() {
        if tag.variants().iter().any(|v| lowered.contains(v)) {
            return Some(*tag);
        }
    }
    None
}

/// Canonicalize a list of mentions, preserving first-occurrence order and
/// dropping both unmappable mentions and repeated tags.
pub fn canonicalize_all<I, S>(mentions: I) -> Vec<MechanismTag>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = Vec::new();
    for mention in mentions {
        if let Some(tag) = canonicalize(mention.as_ref())
            && !seen.contains(&tag)
        {
            seen.push(tag);
        }
    }
    seen
}
