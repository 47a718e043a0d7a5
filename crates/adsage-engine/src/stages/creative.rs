use adsage_contracts::{CampaignRecommendation, CreativeIdea, CreativeSet, Evaluation, Stage};
use adsage_data::{CampaignSnapshot, SuccessfulPatterns};
use adsage_llm::{GenerationRequest, SamplingParams};
use adsage_normalize::CreativesContract;

use crate::prompts;
use crate::stage::StageAdapter;
use crate::timestamp;

const SAMPLING: SamplingParams = SamplingParams::new(0.8, 2000);

/// Campaigns covered by the fallback recommendations.
const FALLBACK_CAMPAIGNS: usize = 3;

pub const NO_TARGETS_NOTE: &str = "No low-CTR campaigns found";
pub const FALLBACK_NOTE: &str = "Fallback recommendations used";

pub struct CreativeInput<'a> {
    /// Low-CTR campaigns, highest spend first. Never empty.
    pub targets: &'a [CampaignSnapshot],
    pub patterns: Option<&'a SuccessfulPatterns>,
    pub insights: &'a Evaluation,
}

/// Proposes new creatives for low-CTR campaigns.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreativeStage;

impl StageAdapter for CreativeStage {
    type Output = CreativeSet;
    type Contract = CreativesContract;
    type Input<'a> = CreativeInput<'a>;

    const STAGE: Stage = Stage::Recommend;

    fn request(&self, input: &CreativeInput<'_>) -> GenerationRequest {
        GenerationRequest::new(
            Stage::Recommend,
            prompts::CREATIVE_SYSTEM,
            prompts::creative_message(input.targets, input.patterns, input.insights),
            SAMPLING,
        )
    }

    fn complete(&self, mut set: CreativeSet, _input: &CreativeInput<'_>) -> CreativeSet {
        if set.timestamp.is_empty() {
            set.timestamp = timestamp();
        }
        set
    }

    fn fallback(&self, input: &CreativeInput<'_>) -> CreativeSet {
        let recommendations = input
            .targets
            .iter()
            .take(FALLBACK_CAMPAIGNS)
            .map(|campaign| CampaignRecommendation {
                campaign_name: campaign.campaign_name.clone(),
                current_ctr: campaign.ctr,
                current_message: campaign.creative_message.clone(),
                issue: "Low CTR".to_string(),
                new_creatives: vec![stock_idea()],
            })
            .collect();

        CreativeSet {
            timestamp: timestamp(),
            recommendations,
            note: Some(FALLBACK_NOTE.to_string()),
        }
    }
}

fn stock_idea() -> CreativeIdea {
    CreativeIdea {
        headline: "Discover Something Better".to_string(),
        message: "Try our new improved offer with better value!".to_string(),
        cta: "Learn More".to_string(),
        creative_type: "Image".to_string(),
        rationale: "Generic refresh for a low-CTR creative".to_string(),
        inspiration: "General improvement".to_string(),
    }
}
