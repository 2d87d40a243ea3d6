//! Static health knowledge: disease blurbs matched by keyword, general tips,
//! and per-symptom self-care recommendations.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use lazy_static::lazy_static;
use rand::seq::SliceRandom;

use crate::artifact::ArtifactError;
use crate::pipeline::normalize_symptom;

/// Used when a logged symptom has no specific recommendation
pub const DEFAULT_RECOMMENDATION: &str = "No specific recommendation. Consult a medical professional.";

lazy_static! {
    static ref DEFAULT_ENTRIES: BTreeMap<String, String> = [
        ("malaria", "Malaria is a mosquito-borne disease. Symptoms include fever, chills, and headache. Prevention includes mosquito nets and antimalarial medicines."),
        ("flu", "Influenza (flu) is a viral illness causing fever, cough, sore throat, and fatigue. Annual vaccination helps prevent the flu."),
        ("covid", "COVID-19 is a respiratory illness caused by coronavirus. Main symptoms are fever, cough, and difficulty breathing. Prevention includes vaccination, masks, and hand-washing."),
        ("cholera", "Cholera is an acute diarrheal illness caused by infection of the intestine with Vibrio cholerae bacteria. Prevention includes clean water and sanitation."),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    static ref SYMPTOM_RECOMMENDATIONS: BTreeMap<&'static str, &'static str> = BTreeMap::from([
        ("fever", "Stay hydrated and rest. Consult a doctor if fever persists."),
        ("cough", "Drink warm fluids and consider a humidifier."),
        ("headache", "Rest in a quiet, dark room and stay hydrated."),
        ("sore throat", "Gargle with salt water and use lozenges."),
    ]);
}

/// Everyday hygiene and wellness tips
pub const HEALTH_TIPS: &[&str] = &[
    "Remember to wash your hands regularly to prevent disease.",
    "Staying hydrated helps your immune system.",
    "Vaccination is a key step in disease prevention.",
    "Eat a balanced diet for good health.",
    "Regular exercise boosts your overall wellness.",
    "If you feel unwell, consult a healthcare professional.",
    "Maintain proper hygiene to reduce disease transmission.",
    "Get enough sleep for a stronger immune system.",
    "Avoid close contact with sick individuals.",
    "Stay informed about local health guidelines.",
];

/// Keyword to answer mapping, scanned in keyword order.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: BTreeMap<String, String>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ENTRIES.clone(),
        }
    }
}

impl KnowledgeBase {
    /// Builds a knowledge base; keywords are lowercased and blank ones dropped.
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(keyword, answer)| (keyword.trim().to_lowercase(), answer))
            .filter(|(keyword, _)| !keyword.is_empty())
            .collect();
        Self { entries }
    }

    /// Loads a JSON object of `keyword -> answer`, replacing the defaults.
    pub fn from_json_path(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = fs::read(path)?;
        let entries: BTreeMap<String, String> = serde_json::from_slice(&bytes)?;
        log::info!("Loaded {} knowledge base entries from {:?}", entries.len(), path);
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the answer for the first keyword contained in the message.
    pub fn lookup(&self, message: &str) -> Option<&str> {
        let message = message.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| message.contains(keyword.as_str()))
            .map(|(_, answer)| answer.as_str())
    }
}

/// Picks one of [`HEALTH_TIPS`] at random
pub fn random_tip() -> &'static str {
    HEALTH_TIPS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(HEALTH_TIPS[0])
}

/// Self-care recommendation for one symptom, or the generic fallback
pub fn recommendation_for(symptom: &str) -> &'static str {
    SYMPTOM_RECOMMENDATIONS
        .get(normalize_symptom(symptom).as_str())
        .copied()
        .unwrap_or(DEFAULT_RECOMMENDATION)
}
