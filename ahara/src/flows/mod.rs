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

//! # Feature Flows
//!
//! One module per AI feature. Each declares its flow name, typed input and
//! output, the schemas with their field descriptions, and the prompt.

pub mod answer_question;
pub mod diet_plan;
pub mod food_analysis;
pub mod recipe_analysis;
pub mod recommend_foods;

pub use self::answer_question::{AnswerOutput, QuestionInput};
pub use self::diet_plan::{DietPlanInput, DietPlanOutput};
pub use self::food_analysis::{FoodAnalysisInput, FoodAnalysisOutput};
pub use self::recipe_analysis::{RecipeAnalysisInput, RecipeAnalysisOutput};
pub use self::recommend_foods::{FoodRecommendation, RecommendFoodsInput, RecommendFoodsOutput};

/// The names of every feature flow, in the order they are defined.
pub const FLOW_NAMES: [&str; 5] = [
    diet_plan::NAME,
    recipe_analysis::NAME,
    food_analysis::NAME,
    answer_question::NAME,
    recommend_foods::NAME,
];

#[cfg(test)]
mod tests {
    use super::*;
    use ahara_core::schema::validate;
    use serde_json::json;

    #[test]
    fn test_every_definition_builds() {
        for definition in [
            diet_plan::definition(),
            recipe_analysis::definition(),
            food_analysis::definition(),
            answer_question::definition(),
            recommend_foods::definition(),
        ] {
            let definition = definition.unwrap();
            assert!(FLOW_NAMES.contains(&definition.name()));
            assert!(definition.description().is_some());
        }
    }

    #[test]
    fn test_recipe_minimum_lengths() {
        let definition = recipe_analysis::definition().unwrap();
        let err = validate(
            definition.input_schema(),
            &json!({ "recipeName": "Ki", "ingredients": "rice", "instructions": "Simmer all together." }),
        )
        .unwrap_err();
        assert_eq!(err.paths(), vec!["/recipeName", "/ingredients"]);
    }

    #[test]
    fn test_food_list_must_hold_json_array() {
        let definition = recommend_foods::definition().unwrap();
        let err = validate(
            definition.input_schema(),
            &json!({ "patientProfile": "p", "searchQuery": "q", "foodList": "rice, barley" }),
        )
        .unwrap_err();
        assert_eq!(err.paths(), vec!["/foodList"]);
    }
}
