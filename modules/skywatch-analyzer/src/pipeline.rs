use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use inference_client::{extract, Inference, InferenceError, StructuredOutput};
use skywatch_common::{ExtractionRecord, RetryPolicy, SocialPost, NOT_SPECIFIED};

// =============================================================================
// Stage contracts
// =============================================================================

/// Stage 1: does the post genuinely report an ongoing or recent disaster?
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DisasterClassification {
    pub genuine_disaster: bool,
}

/// Stage 2: disaster type and location, each "Not Specified" when the post
/// text does not name one.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DisasterAttributes {
    /// The type of natural disaster, or "Not Specified".
    pub disaster_type: String,
    /// A map-friendly location for the disaster, or "Not Specified".
    pub disaster_location: String,
}

/// Stage 3: four independently justified sub-scores, each 0 to 10.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SeverityAssessment {
    pub daily_living_impact_justification: String,
    /// 0 = no impact, 10 = complete disruption of daily life.
    pub daily_living_impact_score: u8,
    pub infrastructure_impact_justification: String,
    /// 0 = no impact, 10 = life-threatening infrastructure damage.
    pub infrastructure_impact_score: u8,
    pub loss_of_life_justification: String,
    /// 0 = no loss of life, 10 = death toll greater than 5.
    pub loss_of_life_score: u8,
    pub emergency_response_justification: String,
    /// 0 = no need for emergency response, 10 = mandatory evacuations and
    /// rescue efforts.
    pub emergency_response_score: u8,
}

impl SeverityAssessment {
    /// Composite severity. The rescale mirrors the original scoring sheet
    /// exactly: mean of four 0-10 sub-scores, expressed on a 0-10 scale.
    pub fn severity_score(&self) -> f64 {
        let sum = self.daily_living_impact_score as u32
            + self.infrastructure_impact_score as u32
            + self.loss_of_life_score as u32
            + self.emergency_response_score as u32;
        (sum as f64 / 40.0) * 10.0
    }

    /// Fallback when the scoring call exhausts its retry budget: neutral
    /// midpoint on every axis.
    pub fn neutral() -> Self {
        let unavailable = || "Assessment unavailable, neutral default applied".to_string();
        Self {
            daily_living_impact_justification: unavailable(),
            daily_living_impact_score: 5,
            infrastructure_impact_justification: unavailable(),
            infrastructure_impact_score: 5,
            loss_of_life_justification: unavailable(),
            loss_of_life_score: 5,
            emergency_response_justification: unavailable(),
            emergency_response_score: 5,
        }
    }
}

/// Post-deserialization bounds check, applied inside the retry loop so an
/// out-of-range reply counts as a schema-validation fault.
trait StageResponse {
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

impl StageResponse for DisasterClassification {}

impl StageResponse for DisasterAttributes {
    fn check(&self) -> Result<(), String> {
        if self.disaster_type.trim().is_empty() || self.disaster_location.trim().is_empty() {
            return Err("disaster_type and disaster_location must be non-empty".into());
        }
        Ok(())
    }
}

impl StageResponse for SeverityAssessment {
    fn check(&self) -> Result<(), String> {
        let scores = [
            ("daily_living_impact_score", self.daily_living_impact_score),
            ("infrastructure_impact_score", self.infrastructure_impact_score),
            ("loss_of_life_score", self.loss_of_life_score),
            ("emergency_response_score", self.emergency_response_score),
        ];
        for (name, score) in scores {
            if score > 10 {
                return Err(format!("{name} out of range: {score}"));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Prompts
// =============================================================================

const CLASSIFY_SYSTEM_PROMPT: &str = r#"You are a social media analyst who is an expert on natural disaster recovery.
Determine whether a social media post genuinely reports an ongoing or recent natural disaster.

## Classify as true when the post
- Provides specific details about an ongoing or recent natural disaster, including locations, victims, warnings, emergency response, aid efforts, or official updates.
- Is a news headline or report about a real natural disaster, even if it contains no personal narrative.
- Mentions verifiable entities (government officials, emergency agencies) discussing natural disaster impact or response.

## Classify as false when the post
- Uses metaphorical language (e.g. "This traffic is a tornado").
- Mentions a natural disaster in a non-literal way, or references a past event with no new developments.
- Is purely emotional or symbolic and provides no verifiable disaster-related information.

## Examples
- "California wildfires: winds die down, helping containment efforts" -> true (specific disaster details, containment efforts)
- "Flood death rate increases in Sri Lanka" -> true (verifiable disaster impact, rising death toll)
- "Blue heart yellow heart please help flood social media with this message" -> false (symbolic use of "flood", no disaster details)
- "the adrenaline of a job well done flooding their bodies and minds" -> false (metaphor only)"#;

const ATTRIBUTES_SYSTEM_PROMPT: &str = r#"You are a social media analyst who is an expert on natural disaster recovery.
Based only on the post text, answer the following questions:
1. What type of natural disaster occurred? If a disaster type is specified in the post text, output the disaster type, else output 'Not Specified'.
2. What is the location of the natural disaster? If a location is specified in the post text, output a map-friendly location, else output 'Not Specified'.
Do not make up facts. Only analyze the post text provided."#;

const SEVERITY_SYSTEM_PROMPT: &str = r#"You are a social media analyst who is an expert on natural disaster recovery.
Do not make up facts. Only analyze based on the post text provided.
Based only on the post information, answer the following questions:
1. Assess the impact of the natural disaster on daily living on a scale from 0 to 10, where 0 is no impact and 10 is complete disruption of daily life. Provide a concise justification before the score.
2. Assess the impact of the natural disaster on infrastructure on a scale from 0 to 10, where 0 is no impact and 10 is life-threatening infrastructure damage. Provide a concise justification before the score.
3. Assess the loss of life on a scale from 0 to 10, where 0 is no loss of life and 10 is a death toll greater than 5. If the death toll is greater than 5, the score must be 10. Provide a concise justification before the score.
4. Assess the need for emergency response measures on a scale from 0 to 10, where 0 is no need for emergency responses and 10 involves mandatory evacuations and rescue efforts. Provide a concise justification before the score."#;

// =============================================================================
// Pipeline
// =============================================================================

/// The three-stage extraction pipeline: classify, then extract attributes,
/// then score severity, each stage gated on the previous one.
pub struct TweetAnalyzer<I: Inference> {
    inference: I,
    retry: RetryPolicy,
}

impl<I: Inference> TweetAnalyzer<I> {
    pub fn new(inference: I) -> Self {
        Self {
            inference,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run one post through the pipeline. Returns the record without
    /// coordinates, or `None` when classification or attribute extraction
    /// exhausted its retry budget — a dropped post, never fabricated data.
    pub async fn analyze(&self, post: &SocialPost) -> Option<ExtractionRecord> {
        let text = post.full_text();

        let classification: DisasterClassification = self
            .call_stage("classify", CLASSIFY_SYSTEM_PROMPT, &classify_user(&text))
            .await?;

        if !classification.genuine_disaster {
            debug!(tweet_id = %post.id, "Not a genuine disaster report");
            return Some(ExtractionRecord::non_disaster(post));
        }

        let attributes: DisasterAttributes = self
            .call_stage("attributes", ATTRIBUTES_SYSTEM_PROMPT, &post_user(&text))
            .await?;

        let mut record = ExtractionRecord {
            tweet_id: post.id.clone(),
            timestamp: post.timestamp.clone(),
            text: text.clone(),
            is_genuine_disaster: true,
            disaster_type: attributes.disaster_type.clone(),
            location: attributes.disaster_location.clone(),
            severity_score: None,
            latitude: None,
            longitude: None,
        };

        if attributes
            .disaster_type
            .trim()
            .eq_ignore_ascii_case(NOT_SPECIFIED)
        {
            debug!(tweet_id = %post.id, "Disaster type not specified, skipping severity");
            return Some(record);
        }

        let assessment = match self
            .call_stage::<SeverityAssessment>(
                "severity",
                SEVERITY_SYSTEM_PROMPT,
                &severity_user(&text, &attributes.disaster_type),
            )
            .await
        {
            Some(assessment) => assessment,
            None => {
                warn!(tweet_id = %post.id, "Severity scoring exhausted retries, using neutral default");
                SeverityAssessment::neutral()
            }
        };

        record.severity_score = Some(assessment.severity_score());
        info!(
            tweet_id = %post.id,
            disaster_type = %record.disaster_type,
            location = %record.location,
            severity = record.severity_score,
            "Post analyzed"
        );
        Some(record)
    }

    /// One structured call with the shared retry policy wrapped around the
    /// call, deserialization, and bounds check together.
    async fn call_stage<T>(&self, stage: &'static str, system: &str, user: &str) -> Option<T>
    where
        T: StructuredOutput + StageResponse,
    {
        let outcome = self
            .retry
            .run(stage, || async move {
                let value: T = extract(&self.inference, system, user).await?;
                value.check().map_err(InferenceError::Schema)?;
                Ok::<T, InferenceError>(value)
            })
            .await;

        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(stage, error = %e, "Stage failed after all attempts");
                None
            }
        }
    }
}

fn classify_user(text: &str) -> String {
    format!("Classify the following post.\n\nPost: \"{text}\"")
}

fn post_user(text: &str) -> String {
    format!("A user posted this:\n\"{text}\"")
}

fn severity_user(text: &str, disaster_type: &str) -> String {
    format!("A user posted this:\n\"{text}\"\n\nNatural Disaster Type: {disaster_type}.")
}
