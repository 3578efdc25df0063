// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod helpers;

use ahara::{
    AnswerOutput, DietPlanInput, FailureKind, FoodAnalysisInput, FoodItem, InvokeOptions,
    OutputMode, PatientProfile, QuestionInput, RecipeAnalysisInput, RecommendFoodsInput,
};
use helpers::{ahara_with, ahara_with_timeout, Reply, ScriptedGenerator};
use rstest::*;
use serde_json::json;
use std::time::{Duration, Instant};

#[fixture]
fn generator() -> ScriptedGenerator {
    ScriptedGenerator::new()
}

fn foods(names: &[&str]) -> Vec<FoodItem> {
    names
        .iter()
        .map(|name| FoodItem {
            name: name.to_string(),
            category: "Vegetable".to_string(),
            properties: "V+P-K-, Bitter, Cooling".to_string(),
            qualities: "Light".to_string(),
        })
        .collect()
}

fn recommendation(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "reasoning": format!("{} cools excess Pitta.", name),
        "ayurvedicProperties": "V+P-K-, Bitter, Cooling"
    })
}

#[rstest]
#[tokio::test]
async fn test_pitta_question_is_answered_verbatim(generator: ScriptedGenerator) {
    let reply = "Favor cooling, sweet foods like cucumber and coconut.";
    generator.reply_text(reply);
    let ahara = ahara_with(&generator);

    let output = ahara
        .answer_question(QuestionInput {
            question: "What foods balance Pitta?".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(output, AnswerOutput { answer: reply.to_string() });
    let prompt = &generator.prompts()[0];
    assert!(prompt.ends_with("Answer the following question:\n  What foods balance Pitta?"));
}

#[rstest]
#[tokio::test]
async fn test_kitchari_recipe_analysis(generator: ScriptedGenerator) {
    generator.reply_text(
        r#"{"nutritionalAnalysis": "* Protein from mung dal\n* Complex carbohydrates", "ayurvedicAnalysis": "* Tridoshic\n* Easy to digest"}"#,
    );
    let ahara = ahara_with(&generator);

    let output = ahara
        .analyze_recipe(RecipeAnalysisInput {
            recipe_name: "Kitchari".to_string(),
            ingredients: "basmati rice, split mung dal, ghee, cumin, turmeric".to_string(),
            instructions: "Rinse, simmer together for 40 minutes, temper with ghee.".to_string(),
        })
        .await
        .unwrap();

    assert!(!output.nutritional_analysis.is_empty());
    assert!(!output.ayurvedic_analysis.is_empty());
    let request = generator.requests.lock().unwrap()[0].clone();
    assert_eq!(request.mode, OutputMode::Json);
    assert!(request.prompt.contains("Recipe Name: Kitchari\n"));
    assert!(request.prompt.contains("Output should be in JSON format"));
}

#[rstest]
#[tokio::test]
async fn test_short_recipe_fields_are_rejected_before_generation(generator: ScriptedGenerator) {
    let ahara = ahara_with(&generator);

    let err = ahara
        .analyze_recipe(RecipeAnalysisInput {
            recipe_name: "Ki".to_string(),
            ingredients: "rice".to_string(),
            instructions: "cook".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Validation);
    assert_eq!(err.http_status(), 400);
    assert_eq!(generator.call_count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_recommendations_never_exceed_food_list(generator: ScriptedGenerator) {
    let reply = json!({
        "recommendations": [recommendation("Cucumber"), recommendation("Coconut"), recommendation("Fennel")]
    });
    generator.reply_text(&reply.to_string());
    let ahara = ahara_with(&generator);
    let patient = PatientProfile {
        name: "Asha".to_string(),
        age: 34,
        gender: "Female".to_string(),
        dosha: "Pitta".to_string(),
        ..Default::default()
    };

    let output = ahara
        .recommend_foods_for(&patient, "cooling vegetables", &foods(&["Cucumber", "Coconut"]))
        .await
        .unwrap();

    assert_eq!(output.recommendations.len(), 2);
    assert_eq!(output.recommendations[0].name, "Cucumber");
    let prompt = &generator.prompts()[0];
    assert!(prompt.contains("Name: Asha, Age: 34, Gender: Female, Dosha: Pitta."));
    assert!(prompt.contains(r#"[{"name":"Cucumber","category":"Vegetable""#));
    assert!(prompt.contains("Food Search Query: \"cooling vegetables\""));
}

#[rstest]
#[tokio::test]
async fn test_bare_recommendation_array_is_accepted(generator: ScriptedGenerator) {
    let reply = json!([recommendation("Cucumber")]);
    generator.reply_text(&format!("```json\n{}\n```", reply));
    let ahara = ahara_with(&generator);

    let output = ahara
        .recommend_foods(RecommendFoodsInput {
            patient_profile: "Name: Asha".to_string(),
            search_query: "cucumber".to_string(),
            food_list: json!([{ "name": "Cucumber" }, { "name": "Coconut" }]).to_string(),
        })
        .await
        .unwrap();

    assert_eq!(output.recommendations.len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_too_many_recommendations_is_schema_mismatch(generator: ScriptedGenerator) {
    let items: Vec<_> = ["A", "B", "C", "D", "E", "F"].iter().map(|n| recommendation(n)).collect();
    generator.reply_text(&json!({ "recommendations": items }).to_string());
    let ahara = ahara_with(&generator);

    let err = ahara
        .recommend_foods(RecommendFoodsInput {
            patient_profile: "Name: Asha".to_string(),
            search_query: "anything".to_string(),
            food_list: "[]".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::SchemaMismatch);
}

#[rstest]
#[tokio::test]
async fn test_diet_plan_times_out(generator: ScriptedGenerator) {
    generator.push(Reply::Hang);
    let ahara = ahara_with_timeout(&generator, Duration::from_millis(25));

    let started = Instant::now();
    let err = ahara
        .generate_diet_plan(DietPlanInput {
            patient_data: "Vata dosha, dry skin, irregular appetite, vegetarian".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(err.user_message().contains("temporarily unavailable"));
}

#[rstest]
#[tokio::test]
async fn test_service_unavailable_is_reported(generator: ScriptedGenerator) {
    generator.push(Reply::Unavailable);
    let ahara = ahara_with(&generator);

    let err = ahara
        .analyze_food(FoodAnalysisInput {
            food_name: "Ghee".to_string(),
            food_properties: "V-P-K+, Sweet, Cooling".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::ServiceUnavailable);
    assert_eq!(err.http_status(), 503);
    assert_eq!(generator.call_count(), 1);
}

#[rstest]
#[tokio::test]
async fn test_analyze_foods_keeps_input_order(generator: ScriptedGenerator) {
    generator
        .push(Reply::Delayed(Duration::from_millis(30), "slow ghee".to_string()))
        .push(Reply::Unavailable)
        .push(Reply::Text("fast fennel".to_string()));
    let ahara = ahara_with(&generator);

    let inputs = ["Ghee", "Honey", "Fennel"]
        .iter()
        .map(|name| FoodAnalysisInput {
            food_name: name.to_string(),
            food_properties: "Sweet".to_string(),
        })
        .collect();
    let results = ahara.analyze_foods(inputs).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().detailed_analysis, "slow ghee");
    assert_eq!(
        results[1].as_ref().unwrap_err().kind(),
        FailureKind::ServiceUnavailable
    );
    assert_eq!(results[2].as_ref().unwrap().detailed_analysis, "fast fennel");
}

#[rstest]
#[tokio::test]
async fn test_invoke_json_by_name(generator: ScriptedGenerator) {
    let ahara = ahara_with(&generator);

    let output = ahara
        .invoke_json(
            "answerDietWellnessQuestionsFlow",
            json!({ "question": "Is ginger heating?" }),
            InvokeOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(output, json!({ "answer": "  Is ginger heating?" }));

    let err = ahara
        .invoke_json("noSuchFlow", json!({}), InvokeOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::NotFound);
    assert_eq!(err.http_status(), 404);
}
