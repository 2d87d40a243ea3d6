use std::sync::Arc;
use symptom_dx::insights::{LifeExpectancyRecord, LifeExpectancyTable, Sex};
use symptom_dx::knowledge::KnowledgeBase;
use symptom_dx::{
    ChatBot, ChatError, ChatErrorKind, ChatResponse, ClassifierError, DiagnosisPipeline, DiseaseDefinition, FeatureVector,
    LabelId, PipelineBuilder, SymptomClassifier,
};

/// Predicts label 1 whenever anything is recognized, otherwise fails.
#[derive(Debug)]
struct PickyClassifier;

impl SymptomClassifier for PickyClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<LabelId, ClassifierError> {
        if features.is_all_zero() {
            return Err(ClassifierError::Inference("empty symptom vector".into()));
        }
        Ok(1)
    }
}

fn setup_bot() -> ChatBot {
    let context = PipelineBuilder::new()
        .with_vocabulary(vec!["itching", "skin_rash", "high_fever"])
        .unwrap()
        .with_labels(vec!["Allergy", "Fungal infection"])
        .unwrap()
        .with_classifier(PickyClassifier)
        .add_disease(
            DiseaseDefinition::new("Fungal infection")
                .with_description("A fungal infection is...")
                .with_precautions(vec![Some("bath twice a day"), Some("use dettol")]),
        )
        .unwrap()
        .build()
        .expect("Failed to build pipeline");

    let table = LifeExpectancyTable::new(vec![
        LifeExpectancyRecord { country: "India".into(), year: 2021, sex: Sex::Female, years: 68.99 },
        LifeExpectancyRecord { country: "India".into(), year: 2021, sex: Sex::Male, years: 66.04 },
    ]);

    ChatBot::new(Arc::new(DiagnosisPipeline::new(context))).with_life_expectancy(table)
}

#[test]
fn test_symptom_message_predicts() {
    let response = setup_bot().respond("Itching, Skin_Rash");
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["type"], "disease_prediction");
    assert_eq!(json["predicted_disease"], "Fungal infection");
    assert_eq!(json["description"], "A fungal infection is...");
    assert_eq!(json["precautions"], serde_json::json!(["bath twice a day", "use dettol"]));
}

#[test]
fn test_unrecognized_symptoms_give_error_reply() {
    let response = setup_bot().respond("purple toes, glowing ears");
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["type"], "error");
    assert_eq!(json["kind"], "PredictionFailed");
    assert!(json.get("cause").is_none());
    assert!(matches!(response, ChatResponse::Error(ChatError { kind: ChatErrorKind::PredictionFailed, .. })));
}

#[test]
fn test_life_expectancy_reply() {
    let response = setup_bot().respond("What is the LIFE EXPECTANCY in India?");
    assert_eq!(
        response,
        ChatResponse::HealthInsight {
            text: "Based on data from 2021, life expectancy for females in India is 68.99 years and for males is 66.04 years.".into()
        }
    );
}

#[test]
fn test_custom_knowledge_base() {
    let kb = KnowledgeBase::new(vec![("dengue".to_string(), "Dengue is spread by mosquitoes.".to_string())]);
    let bot = setup_bot().with_knowledge(kb);
    assert_eq!(bot.respond("tell me about dengue").text(), "Dengue is spread by mosquitoes.");
    assert!(matches!(bot.respond("tell me about malaria"), ChatResponse::Greeting { .. }));
}

#[test]
fn test_offline_predictor_falls_back_to_health_tip() {
    let bot = ChatBot::new(Arc::new(DiagnosisPipeline::unavailable("artifact missing")));
    let json = serde_json::to_value(bot.respond("itching, skin rash")).unwrap();
    assert_eq!(json["type"], "health_tip");
    assert!(symptom_dx::knowledge::HEALTH_TIPS.contains(&json["text"].as_str().unwrap()));

    // knowledge answers still win over the tip
    assert!(matches!(bot.respond("is cholera contagious"), ChatResponse::Knowledge { .. }));
}
