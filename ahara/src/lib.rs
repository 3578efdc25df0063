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

//! # Ahara
//!
//! Schema-bound AI flows for an Ayurvedic diet practice: diet plans, recipe
//! and food analysis, wellness Q&A and food recommendations. Each flow
//! validates its input, renders a prompt, makes exactly one call to the
//! configured [`Generator`] and returns a validated, typed result.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # async fn run(generator: Arc<dyn ahara::Generator>) -> ahara::Result<()> {
//! use ahara::{Ahara, AharaOptions, QuestionInput};
//!
//! let ahara = Ahara::init(AharaOptions::default().with_generator(generator))?;
//! let answer = ahara
//!     .answer_question(QuestionInput { question: "What foods balance Pitta?".into() })
//!     .await?;
//! println!("{}", ahara::markdown::markdown_lite_to_html(&answer.answer));
//! # Ok(())
//! # }
//! ```

pub mod flows;
pub mod markdown;
pub mod options;
pub mod patient;

pub use self::flows::{
    AnswerOutput, DietPlanInput, DietPlanOutput, FoodAnalysisInput, FoodAnalysisOutput,
    FoodRecommendation, QuestionInput, RecipeAnalysisInput, RecipeAnalysisOutput,
    RecommendFoodsInput, RecommendFoodsOutput,
};
pub use self::options::{AharaOptions, DEFAULT_MODEL};
pub use self::patient::{food_list_json, FoodItem, PatientProfile};
pub use ahara_ai::{
    CancellationToken, Flow, GenerateRequest, GenerationConfig, Generator, InvokeOptions,
    Invoker, OutputMode,
};
pub use ahara_core::{logging, Error, FailureKind, Registry, Result, Status, StatusCode};

use self::flows::{answer_question, diet_plan, food_analysis, recipe_analysis, recommend_foods};
use serde_json::{json, Value};
use std::sync::Arc;

/// The application handle: one registry, one invoker and the five flows.
#[derive(Debug)]
pub struct Ahara {
    registry: Registry,
    invoker: Invoker,
    diet_plan: Flow<DietPlanInput, DietPlanOutput>,
    recipe_analysis: Flow<RecipeAnalysisInput, RecipeAnalysisOutput>,
    food_analysis: Flow<FoodAnalysisInput, FoodAnalysisOutput>,
    answer_question: Flow<QuestionInput, AnswerOutput>,
    recommend_foods: Flow<RecommendFoodsInput, RecommendFoodsOutput>,
}

impl Ahara {
    /// Builds the invoker and defines every flow.
    ///
    /// Fails when no generator is configured, or when a flow definition is
    /// inconsistent (a template naming an undeclared field, say).
    pub fn init(options: AharaOptions) -> Result<Arc<Self>> {
        let generator = options
            .generator
            .ok_or_else(|| Error::new_internal("no generator configured"))?;
        let invoker = Invoker::new(generator)
            .with_config(options.config)
            .with_timeout(options.timeout);
        let registry = Registry::new();

        let ahara = Self {
            diet_plan: diet_plan::define(&registry, invoker.clone())?,
            recipe_analysis: recipe_analysis::define(&registry, invoker.clone())?,
            food_analysis: food_analysis::define(&registry, invoker.clone())?,
            answer_question: answer_question::define(&registry, invoker.clone())?,
            recommend_foods: recommend_foods::define(&registry, invoker.clone())?,
            registry,
            invoker,
        };
        logging::log_structured(
            "ahara initialized",
            json!({
                "flows": ahara.registry.list_flows(),
                "model": ahara.invoker.config().model,
                "timeoutMs": ahara.invoker.timeout().as_millis() as u64,
            }),
        );
        Ok(Arc::new(ahara))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    pub fn diet_plan_flow(&self) -> &Flow<DietPlanInput, DietPlanOutput> {
        &self.diet_plan
    }

    pub fn recipe_analysis_flow(&self) -> &Flow<RecipeAnalysisInput, RecipeAnalysisOutput> {
        &self.recipe_analysis
    }

    pub fn food_analysis_flow(&self) -> &Flow<FoodAnalysisInput, FoodAnalysisOutput> {
        &self.food_analysis
    }

    pub fn answer_question_flow(&self) -> &Flow<QuestionInput, AnswerOutput> {
        &self.answer_question
    }

    pub fn recommend_foods_flow(&self) -> &Flow<RecommendFoodsInput, RecommendFoodsOutput> {
        &self.recommend_foods
    }

    pub async fn generate_diet_plan(&self, input: DietPlanInput) -> Result<DietPlanOutput> {
        self.diet_plan.invoke(input).await
    }

    /// Generates a diet plan from a patient record's summary.
    pub async fn generate_diet_plan_for(&self, patient: &PatientProfile) -> Result<DietPlanOutput> {
        self.generate_diet_plan(DietPlanInput {
            patient_data: patient.summary(),
        })
        .await
    }

    pub async fn analyze_recipe(&self, input: RecipeAnalysisInput) -> Result<RecipeAnalysisOutput> {
        self.recipe_analysis.invoke(input).await
    }

    pub async fn analyze_food(&self, input: FoodAnalysisInput) -> Result<FoodAnalysisOutput> {
        self.food_analysis.invoke(input).await
    }

    /// Analyses many foods concurrently. Results come back in input order,
    /// one per input; a failure for one food does not affect the others.
    pub async fn analyze_foods(
        &self,
        inputs: Vec<FoodAnalysisInput>,
    ) -> Vec<Result<FoodAnalysisOutput>> {
        futures::future::join_all(inputs.into_iter().map(|input| self.analyze_food(input))).await
    }

    pub async fn answer_question(&self, input: QuestionInput) -> Result<AnswerOutput> {
        self.answer_question.invoke(input).await
    }

    pub async fn recommend_foods(&self, input: RecommendFoodsInput) -> Result<RecommendFoodsOutput> {
        self.recommend_foods.invoke(input).await
    }

    /// Recommends foods from `foods` for `patient`.
    pub async fn recommend_foods_for(
        &self,
        patient: &PatientProfile,
        search_query: &str,
        foods: &[FoodItem],
    ) -> Result<RecommendFoodsOutput> {
        self.recommend_foods(RecommendFoodsInput {
            patient_profile: patient.summary(),
            search_query: search_query.to_string(),
            food_list: food_list_json(foods)?,
        })
        .await
    }

    /// Runs the flow called `name` on an untyped JSON input.
    pub async fn invoke_json(&self, name: &str, input: Value, options: InvokeOptions) -> Result<Value> {
        match name {
            diet_plan::NAME => self.diet_plan.invoke_json(input, options).await,
            recipe_analysis::NAME => self.recipe_analysis.invoke_json(input, options).await,
            food_analysis::NAME => self.food_analysis.invoke_json(input, options).await,
            answer_question::NAME => self.answer_question.invoke_json(input, options).await,
            recommend_foods::NAME => self.recommend_foods.invoke_json(input, options).await,
            other => Err(Error::NotFound(other.to_string())),
        }
    }
}
