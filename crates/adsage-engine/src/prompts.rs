//! Prompt text for the generated stages
//!
//! System instructions describe the target contract; the user message carries
//! the run context rendered as markdown.

use adsage_contracts::{Evaluation, HypothesisSet, Plan};
use adsage_data::{CampaignSnapshot, DataSummary, QuantitativeChecks, SuccessfulPatterns};
use serde::Serialize;

/// Appended to every user message.
const JSON_ONLY: &str = "Return ONLY the JSON object. No markdown fences, no commentary.";

/// Hypotheses shown to the creative stage.
const MAX_CREATIVE_INSIGHTS: usize = 5;

/// Campaigns shown to the creative stage.
const MAX_CREATIVE_TARGETS: usize = 5;

pub const PLAN_SYSTEM: &str = r#"You are a strategic planner for Facebook Ads performance analysis.

Decompose the user's question into analysis tasks. Respond with a JSON object using exactly these keys:

{
  "query": "the user's question",
  "intent": "diagnose_drop | optimize_performance | general_analysis",
  "tasks": [
    {
      "task_id": "T1",
      "description": "what to analyze",
      "data_requirements": ["column_name"],
      "expected_output": "expected result"
    }
  ],
  "success_criteria": "how to tell the analysis succeeded"
}

The list of tasks MUST be under the key "tasks". Available columns: date, campaign_name, adset_name, spend, impressions, clicks, ctr, purchases, revenue, roas, creative_type, creative_message, audience_type, platform, country."#;

pub const INSIGHT_SYSTEM: &str = r#"You are an expert Facebook Ads analyst focused on ROAS.

Explain the observed performance with 3-5 evidence-based hypotheses that cite specific numbers. Respond with a JSON object:

{
  "timestamp": "ISO 8601",
  "query": "the user's question",
  "hypotheses": [
    {
      "id": "H1",
      "hypothesis": "what happened and why",
      "confidence": 0.8,
      "evidence": ["data point", "data point"],
      "recommendation": "actionable next step",
      "category": "creative_fatigue | audience_saturation | seasonal | technical"
    }
  ],
  "reasoning": "how you reached these hypotheses"
}

Confidence is a number between 0 and 1."#;

pub const EVALUATOR_SYSTEM: &str = r#"You are a quantitative analyst validating marketing hypotheses against data.

Adjust each hypothesis confidence to the quality of its evidence: 0.75-1.0 strong, 0.5-0.74 moderate, below 0.5 weak. Respond with a JSON object:

{
  "timestamp": "ISO 8601",
  "hypotheses": [
    {
      "id": "H1",
      "hypothesis": "...",
      "confidence": 0.85,
      "original_confidence": 0.8,
      "evidence": ["..."],
      "recommendation": "...",
      "category": "...",
      "validation": {
        "supports": ["what confirms it"],
        "contradicts": ["what argues against it"],
        "data_gaps": ["what data is missing"]
      }
    }
  ],
  "validation_summary": "overall assessment"
}"#;

pub const CREATIVE_SYSTEM: &str = r#"You are a creative strategist for Facebook Ads.

Propose new creatives for each underperforming campaign, drawing on what works in the account. Respond with a JSON object:

{
  "timestamp": "ISO 8601",
  "recommendations": [
    {
      "campaign_name": "",
      "current_ctr": 0.0,
      "current_message": "",
      "issue": "",
      "new_creatives": [
        {
          "headline": "",
          "message": "",
          "cta": "",
          "creative_type": "",
          "rationale": "",
          "inspiration": ""
        }
      ]
    }
  ]
}

current_ctr is a fraction (0.012 means 1.2%)."#;

pub fn plan_message(query: &str) -> String {
    format!("Create a plan for: {query}\n\n{JSON_ONLY}")
}

/// Context for hypothesis generation, including the previous attempt on a
/// reflection pass.
pub fn insight_message(
    query: &str,
    summary: &DataSummary,
    plan: &Plan,
    previous: Option<&Evaluation>,
) -> String {
    let mut ctx = format!("# Ads Performance Analysis\n\nQuery: {query}\n\n");

    let perf = &summary.performance_metrics;
    ctx.push_str("## Overall Metrics\n");
    ctx.push_str(&format!("- Total Spend: ${:.2}\n", perf.total_spend));
    ctx.push_str(&format!("- Total Revenue: ${:.2}\n", perf.total_revenue));
    ctx.push_str(&format!("- Average ROAS: {:.2}\n", perf.avg_roas));
    ctx.push_str(&format!("- Average CTR: {}\n", percent(perf.avg_ctr)));
    ctx.push_str(&format!("- Median ROAS: {:.2}\n\n", perf.median_roas));

    if let Some(time) = &summary.time_analysis {
        ctx.push_str("## Week-over-Week\n");
        ctx.push_str(&format!("- Recent ROAS: {:.2}\n", time.recent_week.avg_roas));
        ctx.push_str(&format!("- Previous ROAS: {:.2}\n", time.previous_week.avg_roas));
        ctx.push_str(&format!("- Recent CTR: {}\n", percent(time.recent_week.avg_ctr)));
        ctx.push_str(&format!("- Previous CTR: {}\n", percent(time.previous_week.avg_ctr)));
        ctx.push_str(&format!("- ROAS Change: {:.1}%\n", time.changes.roas_change_pct));
        ctx.push_str(&format!("- CTR Change: {:.1}%\n\n", time.changes.ctr_change_pct));
    }

    if let Some(creative) = &summary.creative_analysis {
        ctx.push_str("## Creative Performance\n");
        for group in &creative.by_type {
            ctx.push_str(&format!(
                "- {}: ROAS {:.2}, CTR {}\n",
                group.name,
                group.roas,
                percent(group.ctr)
            ));
        }
        ctx.push('\n');
    }

    let under = &summary.underperformers;
    ctx.push_str("## Underperforming Segments\n");
    ctx.push_str(&format!("- Low CTR rows: {}\n", under.count_low_ctr));
    ctx.push_str(&format!("- Low ROAS rows: {}\n\n", under.count_low_roas));

    if !plan.tasks.is_empty() {
        ctx.push_str("## Analysis Plan\n");
        for task in &plan.tasks {
            ctx.push_str(&format!("- {}: {}\n", task.task_id, task.description));
        }
        ctx.push('\n');
    }

    if let Some(previous) = previous {
        ctx.push_str("## Previous Attempt (Low Confidence)\n");
        ctx.push_str(&format!(
            "Overall confidence was {:.2}. Go deeper and cite stronger evidence.\n",
            previous.overall_confidence
        ));
        ctx.push_str(&to_json(&previous.to_hypotheses()));
        ctx.push_str("\n\n");
    }

    ctx.push_str("Generate 3-5 evidence-based hypotheses. ");
    ctx.push_str(JSON_ONLY);
    ctx.push('\n');
    ctx
}

/// Context for hypothesis validation.
pub fn evaluation_message(
    hypotheses: &HypothesisSet,
    summary: &DataSummary,
    checks: &QuantitativeChecks,
) -> String {
    let mut ctx = String::from("# Hypothesis Validation\n\n## Hypotheses to Validate\n");

    for h in &hypotheses.hypotheses {
        ctx.push_str(&format!("\n### {}: {}\n", h.id, h.hypothesis));
        ctx.push_str(&format!("- Confidence: {}\n", h.confidence));
        ctx.push_str(&format!("- Evidence: {}\n", to_json(&h.evidence)));
        ctx.push_str(&format!("- Category: {}\n", h.category));
    }

    ctx.push_str(&format!("\n## Quantitative Checks\n{}\n", to_json(checks)));
    ctx.push_str(&format!(
        "\n## Performance\n{}\n",
        to_json(&summary.performance_metrics)
    ));
    if let Some(time) = &summary.time_analysis {
        ctx.push_str(&format!("\n## Time Analysis\n{}\n", to_json(time)));
    }

    ctx.push_str("\nValidate each hypothesis and adjust its confidence. ");
    ctx.push_str(JSON_ONLY);
    ctx.push('\n');
    ctx
}

/// Context for creative recommendations.
pub fn creative_message(
    targets: &[CampaignSnapshot],
    patterns: Option<&SuccessfulPatterns>,
    insights: &Evaluation,
) -> String {
    let mut ctx = String::from("# Creative Recommendations\n\n## Underperforming Campaigns\n");

    for campaign in targets.iter().take(MAX_CREATIVE_TARGETS) {
        ctx.push_str(&format!("\n- **{}**\n", campaign.campaign_name));
        ctx.push_str(&format!("  - CTR: {}\n", percent(campaign.ctr)));
        ctx.push_str(&format!("  - Message: {}\n", campaign.creative_message));
        ctx.push_str(&format!("  - Spend: ${:.2}\n", campaign.spend));
        ctx.push_str(&format!("  - ROAS: {:.2}\n", campaign.roas));
    }

    ctx.push_str("\n## Successful Patterns\n");
    match patterns {
        Some(patterns) => ctx.push_str(&to_json(patterns)),
        None => ctx.push_str("No high performers detected"),
    }

    ctx.push_str("\n\n## Key Insights\n");
    if insights.hypotheses.is_empty() {
        ctx.push_str("- No hypotheses available\n");
    }
    for h in insights.hypotheses.iter().take(MAX_CREATIVE_INSIGHTS) {
        ctx.push_str(&format!("- {}\n", h.hypothesis));
    }

    ctx.push('\n');
    ctx.push_str(JSON_ONLY);
    ctx
}

/// A CTR fraction as a percentage with two decimals.
pub(crate) fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
