//! Routes a free-text chat message to the prediction pipeline, the
//! life-expectancy insight, the knowledge base, or a greeting or health tip.

use std::sync::Arc;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::insights::LifeExpectancyTable;
use crate::knowledge::{self, KnowledgeBase};
use crate::pipeline::{DiagnosisPipeline, Prediction, PredictionError, PredictionErrorKind};

/// Country the life-expectancy insight reports on
pub const DEFAULT_COUNTRY: &str = "India";

pub const GREETINGS: &[&str] = &[
    "Hello! I am a health awareness chatbot. Ask me about 'life expectancy' or provide comma-separated symptoms (e.g., 'itching, skin rash') for a prediction.",
    "I can provide health insights or predict a disease from symptoms. What would you like to know?",
    "You can ask me a health question, or list some symptoms separated by commas.",
];

const INSIGHT_UNAVAILABLE: &str = "Could not retrieve life expectancy data.";

/// What the user is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    LifeExpectancy,
    /// Comma-separated symptom list, already split and trimmed
    Symptoms(Vec<String>),
    Knowledge,
    /// No match while symptom prediction is offline
    HealthTip,
    Greeting,
}

/// Decides the intent of a message.
///
/// Checked in order: "life expectancy" anywhere in the message; a comma,
/// but only while the prediction path is available; a knowledge-base
/// keyword. With nothing matched the reply is a greeting pointing at the
/// predictor, or a health tip when the predictor is offline.
pub fn detect_intent(message: &str, prediction_available: bool, knowledge: &KnowledgeBase) -> Intent {
    let message = message.to_lowercase();

    if message.contains("life expectancy") {
        return Intent::LifeExpectancy;
    }
    if prediction_available && message.contains(',') {
        let symptoms = message
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        return Intent::Symptoms(symptoms);
    }
    if knowledge.lookup(&message).is_some() {
        return Intent::Knowledge;
    }
    if !prediction_available {
        return Intent::HealthTip;
    }
    Intent::Greeting
}

/// Reply to one chat message, serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatResponse {
    DiseasePrediction(Prediction),
    HealthInsight { text: String },
    Knowledge { text: String },
    HealthTip { text: String },
    Greeting { text: String },
    Error(ChatError),
}

/// Why a chat request produced an error reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChatErrorKind {
    ModelUnavailable,
    UnknownLabel,
    PredictionFailed,
    /// No life expectancy data for the configured country
    InsightUnavailable,
}

impl From<PredictionErrorKind> for ChatErrorKind {
    fn from(kind: PredictionErrorKind) -> Self {
        match kind {
            PredictionErrorKind::ModelUnavailable => Self::ModelUnavailable,
            PredictionErrorKind::UnknownLabel => Self::UnknownLabel,
            PredictionErrorKind::PredictionFailed => Self::PredictionFailed,
        }
    }
}

/// Serialized form of an error reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub detail: String,
}

impl From<PredictionError> for ChatResponse {
    fn from(err: PredictionError) -> Self {
        ChatResponse::Error(ChatError {
            kind: err.kind.into(),
            detail: err.detail,
        })
    }
}

impl ChatResponse {
    pub fn text(&self) -> &str {
        match self {
            Self::DiseasePrediction(prediction) => &prediction.disease,
            Self::HealthInsight { text }
            | Self::Knowledge { text }
            | Self::HealthTip { text }
            | Self::Greeting { text } => text,
            Self::Error(body) => &body.detail,
        }
    }
}

/// Everything a chat request can reach, built once at startup.
#[derive(Debug, Clone)]
pub struct ChatBot {
    pipeline: Arc<DiagnosisPipeline>,
    knowledge: KnowledgeBase,
    life_expectancy: Option<Arc<LifeExpectancyTable>>,
    country: String,
}

impl ChatBot {
    pub fn new(pipeline: Arc<DiagnosisPipeline>) -> Self {
        Self {
            pipeline,
            knowledge: KnowledgeBase::default(),
            life_expectancy: None,
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    pub fn with_knowledge(mut self, knowledge: KnowledgeBase) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn with_life_expectancy(mut self, table: LifeExpectancyTable) -> Self {
        self.life_expectancy = Some(Arc::new(table));
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn pipeline(&self) -> &DiagnosisPipeline {
        &self.pipeline
    }

    pub fn respond(&self, message: &str) -> ChatResponse {
        match detect_intent(message, self.pipeline.is_available(), &self.knowledge) {
            Intent::LifeExpectancy => self.life_expectancy_reply(),
            Intent::Symptoms(symptoms) => match self.pipeline.assemble(&symptoms) {
                Ok(prediction) => ChatResponse::DiseasePrediction(prediction),
                Err(err) => err.into(),
            },
            Intent::Knowledge => ChatResponse::Knowledge {
                text: self.knowledge.lookup(message).unwrap_or_default().to_string(),
            },
            Intent::HealthTip => ChatResponse::HealthTip {
                text: knowledge::random_tip().to_string(),
            },
            Intent::Greeting => ChatResponse::Greeting {
                text: GREETINGS
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or(GREETINGS[0])
                    .to_string(),
            },
        }
    }

    fn life_expectancy_reply(&self) -> ChatResponse {
        let summary = self
            .life_expectancy
            .as_ref()
            .and_then(|table| table.summarize(&self.country));

        match summary {
            Some(summary) => ChatResponse::HealthInsight { text: summary.to_text() },
            None => {
                log::warn!("Life expectancy requested but no data for {}", self.country);
                ChatResponse::Error(ChatError {
                    kind: ChatErrorKind::InsightUnavailable,
                    detail: INSIGHT_UNAVAILABLE.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_order() {
        let kb = KnowledgeBase::default();
        assert_eq!(detect_intent("Life Expectancy, please", true, &kb), Intent::LifeExpectancy);
        assert_eq!(
            detect_intent("Itching, skin rash,", true, &kb),
            Intent::Symptoms(vec!["itching".into(), "skin rash".into()])
        );
        assert_eq!(detect_intent("fever, malaria", false, &kb), Intent::Knowledge);
        assert_eq!(detect_intent("hi there", true, &kb), Intent::Greeting);
        assert_eq!(detect_intent("hi there", false, &kb), Intent::HealthTip);
    }

    #[test]
    fn test_unavailable_pipeline_never_routes_symptoms() {
        let bot = ChatBot::new(Arc::new(DiagnosisPipeline::unavailable("no artifact")));
        let response = bot.respond("itching, skin rash");
        assert!(matches!(response, ChatResponse::HealthTip { .. }));
        assert!(knowledge::HEALTH_TIPS.contains(&response.text()));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "health_tip");
    }

    #[test]
    fn test_life_expectancy_without_data() {
        let bot = ChatBot::new(Arc::new(DiagnosisPipeline::unavailable("no artifact")));
        let json = serde_json::to_value(bot.respond("life expectancy in India")).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["kind"], "InsightUnavailable");
        assert_eq!(json["detail"], INSIGHT_UNAVAILABLE);

        match bot.respond("Life expectancy?") {
            ChatResponse::Error(err) => assert_eq!(err.kind, ChatErrorKind::InsightUnavailable),
            other => panic!("expected an error reply, got {:?}", other),
        }
    }

    #[test]
    fn test_prediction_error_kinds_carry_over() {
        let response: ChatResponse = PredictionError::model_unavailable("no artifact").into();
        assert_eq!(
            response,
            ChatResponse::Error(ChatError {
                kind: ChatErrorKind::ModelUnavailable,
                detail: "Machine learning model is not available.".to_string(),
            })
        );
    }

    #[test]
    fn test_knowledge_reply_serializes() {
        let bot = ChatBot::new(Arc::new(DiagnosisPipeline::unavailable("no artifact")));
        let json = serde_json::to_value(bot.respond("How do I avoid COVID?")).unwrap();
        assert_eq!(json["type"], "knowledge");
        assert!(json["text"].as_str().unwrap().starts_with("COVID-19"));
    }
}
