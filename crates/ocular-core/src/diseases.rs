//! Static reference data for each diagnosis class.

use serde::Serialize;

use crate::label::ClassLabel;

/// Encyclopedia entry for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiseaseInfo {
    pub name: ClassLabel,
    pub slug: &'static str,
    /// Short tag, e.g. "Lens Clouding".
    pub tag: &'static str,
    pub description: &'static str,
    pub symptoms: &'static [&'static str],
    pub causes: &'static [&'static str],
    pub treatments: &'static [&'static str],
    pub prevention: &'static [&'static str],
    /// Accent color used by presentation layers.
    pub color: &'static str,
}

const NORMAL: DiseaseInfo = DiseaseInfo {
    name: ClassLabel::Normal,
    slug: "normal",
    tag: "Healthy",
    description: "A healthy retina with no signs of lesions, bleeding, or nerve damage. \
                  The macula and optic disc appear clear.",
    symptoms: &[
        "Clear, sharp vision",
        "No pain or discomfort",
        "Normal night vision",
    ],
    causes: &["N/A"],
    treatments: &[
        "Routine eye exams (1-2 years)",
        "UV protection",
        "Healthy diet",
    ],
    prevention: &["Wear sunglasses", "20-20-20 rule for screens"],
    color: "green",
};

const CATARACT: DiseaseInfo = DiseaseInfo {
    name: ClassLabel::Cataract,
    slug: "cataract",
    tag: "Lens Clouding",
    description: "Clouding of the eye's natural lens, causing blurry vision like looking \
                  through a foggy window.",
    symptoms: &[
        "Cloudy/blurry vision",
        "Faded colors",
        "Glare/Halos around lights",
        "Poor night vision",
    ],
    causes: &["Aging", "Diabetes", "UV Exposure", "Smoking"],
    treatments: &[
        "Surgery (IOL Replacement)",
        "Brighter lighting (early stage)",
    ],
    prevention: &[
        "Quit smoking",
        "Manage diabetes",
        "Antioxidant-rich diet",
    ],
    color: "blue",
};

const GLAUCOMA: DiseaseInfo = DiseaseInfo {
    name: ClassLabel::Glaucoma,
    slug: "glaucoma",
    tag: "Optic Nerve Damage",
    description: "Damage to the optic nerve, often caused by abnormally high pressure. \
                  Known as the 'silent thief of vision'.",
    symptoms: &[
        "Patchy blind spots",
        "Tunnel vision",
        "Severe eye pain (Acute)",
        "Nausea",
    ],
    causes: &["High eye pressure", "Family history", "Age (>60)"],
    treatments: &[
        "Prescription eye drops",
        "Laser treatment",
        "Microsurgery",
    ],
    prevention: &["Regular screenings", "Exercise", "Eye protection"],
    color: "orange",
};

const DIABETIC_RETINOPATHY: DiseaseInfo = DiseaseInfo {
    name: ClassLabel::DiabeticRetinopathy,
    slug: "diabetic-retinopathy",
    tag: "Retinal Vessel Damage",
    description: "Complication of diabetes where high blood sugar damages retinal blood vessels.",
    symptoms: &[
        "Floaters (spots)",
        "Fluctuating vision",
        "Dark areas",
        "Vision loss",
    ],
    causes: &[
        "Uncontrolled diabetes",
        "High blood pressure",
        "High cholesterol",
    ],
    treatments: &[
        "Control blood sugar",
        "Laser photocoagulation",
        "Anti-VEGF injections",
    ],
    prevention: &[
        "Strict sugar control",
        "Annual screening",
        "Healthy blood pressure",
    ],
    color: "red",
};

/// Reference entry for `label`.
pub fn disease_info(label: ClassLabel) -> &'static DiseaseInfo {
    match label {
        ClassLabel::Cataract => &CATARACT,
        ClassLabel::DiabeticRetinopathy => &DIABETIC_RETINOPATHY,
        ClassLabel::Glaucoma => &GLAUCOMA,
        ClassLabel::Normal => &NORMAL,
    }
}

/// Look up an entry by display name or slug.
pub fn find_disease(name: &str) -> Option<&'static DiseaseInfo> {
    name.parse::<ClassLabel>().ok().map(disease_info)
}
