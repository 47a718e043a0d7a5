//! Markdown report assembled from the final run values

use std::fmt;

use adsage_contracts::{CreativeSet, Evaluation};

use crate::prompts::percent;

const MAX_FINDINGS: usize = 3;
const MAX_CAMPAIGNS: usize = 5;
const MAX_IDEAS: usize = 2;

const NEXT_STEPS: [&str; 4] = [
    "Implement creative refreshes for campaigns with declining CTR",
    "Monitor performance daily for the next week",
    "A/B test new creative concepts against current winners",
    "Review audience targeting for fatigued segments",
];

/// Badge shown next to a finding.
#[must_use]
pub fn confidence_badge(confidence: f64) -> &'static str {
    if confidence >= 0.75 {
        "high"
    } else if confidence >= 0.5 {
        "medium"
    } else {
        "low"
    }
}

/// The marketer-facing report for one run.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub query: &'a str,
    pub insights: &'a Evaluation,
    pub creatives: &'a CreativeSet,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_header(f, self.query)?;
        write_findings(f, self.insights)?;
        write_creatives(f, self.creatives)?;
        write_footer(f, &self.insights.timestamp)
    }
}

/// Render the marketer-facing report.
#[must_use]
pub fn render_report(query: &str, insights: &Evaluation, creatives: &CreativeSet) -> String {
    Report {
        query,
        insights,
        creatives,
    }
    .to_string()
}

fn write_header(out: &mut fmt::Formatter<'_>, query: &str) -> fmt::Result {
    writeln!(out, "# Facebook Ads Performance Analysis Report")?;
    writeln!(out)?;
    writeln!(out, "## Query")?;
    writeln!(out, "{query}")?;
    writeln!(out)?;
    writeln!(out, "## Executive Summary")?;
    writeln!(out)?;
    writeln!(
        out,
        "This analysis examined Facebook Ads performance data to identify drivers of ROAS \
         fluctuation and provide actionable recommendations."
    )?;
    writeln!(out)
}

fn write_findings(out: &mut fmt::Formatter<'_>, insights: &Evaluation) -> fmt::Result {
    writeln!(out, "### Key Findings")?;
    writeln!(out)?;

    if insights.hypotheses.is_empty() {
        writeln!(
            out,
            "*No hypotheses were generated. Please check the data quality and try again.*"
        )?;
        return writeln!(out);
    }

    for (i, h) in insights.hypotheses.iter().take(MAX_FINDINGS).enumerate() {
        writeln!(
            out,
            "#### {}. {} [{} confidence]",
            i + 1,
            h.hypothesis,
            confidence_badge(h.confidence)
        )?;
        writeln!(out, "**Confidence:** {:.0}%", h.confidence * 100.0)?;
        writeln!(out)?;
        writeln!(out, "**Evidence:**")?;
        if h.evidence.is_empty() {
            writeln!(out, "- No evidence available")?;
        }
        for evidence in &h.evidence {
            writeln!(out, "- {evidence}")?;
        }
        writeln!(out)?;
        let recommendation = if h.recommendation.is_empty() {
            "No recommendation available"
        } else {
            h.recommendation.as_str()
        };
        writeln!(out, "**Recommendation:** {recommendation}")?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_creatives(out: &mut fmt::Formatter<'_>, creatives: &CreativeSet) -> fmt::Result {
    writeln!(out, "## Creative Recommendations")?;
    writeln!(out)?;

    if creatives.recommendations.is_empty() {
        match &creatives.note {
            Some(note) => writeln!(out, "*No creative recommendations were generated: {note}.*")?,
            None => writeln!(out, "*No creative recommendations were generated.*")?,
        }
        return writeln!(out);
    }

    writeln!(
        out,
        "We identified {} campaigns that would benefit from creative refresh:",
        creatives.recommendations.len()
    )?;
    writeln!(out)?;

    for rec in creatives.recommendations.iter().take(MAX_CAMPAIGNS) {
        writeln!(out, "### Campaign: {}", rec.campaign_name)?;
        writeln!(out, "- **Current CTR:** {}", percent(rec.current_ctr))?;
        writeln!(out, "- **Current Message:** \"{}\"", rec.current_message)?;
        writeln!(out)?;
        writeln!(out, "**New Creative Ideas:**")?;
        writeln!(out)?;
        if rec.new_creatives.is_empty() {
            writeln!(out, "*No new creatives generated for this campaign.*")?;
        }
        for (i, idea) in rec.new_creatives.iter().take(MAX_IDEAS).enumerate() {
            writeln!(out, "{}. **Headline:** {}", i + 1, idea.headline)?;
            writeln!(out, "   - **Message:** {}", idea.message)?;
            writeln!(out, "   - **CTA:** {}", idea.cta)?;
            writeln!(out, "   - **Rationale:** {}", idea.rationale)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_footer(out: &mut fmt::Formatter<'_>, timestamp: &str) -> fmt::Result {
    writeln!(out, "## Next Steps")?;
    writeln!(out)?;
    for (i, step) in NEXT_STEPS.iter().enumerate() {
        writeln!(out, "{}. {step}", i + 1)?;
    }
    writeln!(out)?;
    writeln!(out, "---")?;
    let timestamp = if timestamp.is_empty() { "N/A" } else { timestamp };
    writeln!(out, "*Timestamp: {timestamp}*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsage_contracts::{CampaignRecommendation, CreativeIdea, Hypothesis, HypothesisSet};

    fn insights(confidences: &[f64]) -> Evaluation {
        let set = HypothesisSet {
            timestamp: "2024-03-01T09:00:00Z".to_string(),
            query: "Why did ROAS drop?".to_string(),
            hypotheses: confidences
                .iter()
                .enumerate()
                .map(|(i, &confidence)| Hypothesis {
                    id: format!("H{}", i + 1),
                    hypothesis: format!("Finding {}", i + 1),
                    confidence,
                    evidence: vec![format!("Evidence {}", i + 1)],
                    recommendation: "Refresh creatives".to_string(),
                    category: "creative_fatigue".to_string(),
                })
                .collect(),
            reasoning: String::new(),
        };
        Evaluation::unvalidated(&set, "ok")
    }

    fn idea(headline: &str) -> CreativeIdea {
        CreativeIdea {
            headline: headline.to_string(),
            message: "Save today".to_string(),
            cta: "Shop Now".to_string(),
            creative_type: "Image".to_string(),
            rationale: "Urgency".to_string(),
            inspiration: String::new(),
        }
    }

    #[test]
    fn test_badges() {
        assert_eq!(confidence_badge(0.75), "high");
        assert_eq!(confidence_badge(0.74), "medium");
        assert_eq!(confidence_badge(0.5), "medium");
        assert_eq!(confidence_badge(0.49), "low");
    }

    #[test]
    fn test_report_limits_findings_and_ideas() {
        let creatives = CreativeSet {
            timestamp: String::new(),
            recommendations: vec![CampaignRecommendation {
                campaign_name: "Summer Sale".to_string(),
                current_ctr: 0.0084,
                current_message: "Big summer savings".to_string(),
                issue: "Low CTR".to_string(),
                new_creatives: vec![idea("One"), idea("Two"), idea("Three")],
            }],
            note: None,
        };
        let report = render_report("Why did ROAS drop?", &insights(&[0.9, 0.6, 0.2, 0.8]), &creatives);

        assert!(report.contains("## Query\nWhy did ROAS drop?"));
        assert!(report.contains("#### 1. Finding 1 [high confidence]"));
        assert!(report.contains("#### 3. Finding 3 [low confidence]"));
        assert!(!report.contains("Finding 4"));
        assert!(report.contains("**Current CTR:** 0.84%"));
        assert!(report.contains("2. **Headline:** Two"));
        assert!(!report.contains("Three"));
        assert!(report.contains("*Timestamp: 2024-03-01T09:00:00Z*"));
    }

    #[test]
    fn test_report_for_empty_results() {
        let empty = Evaluation::empty("", "failed");
        let creatives = CreativeSet::empty("", Some("No low-CTR campaigns found".to_string()));
        let report = render_report("q", &empty, &creatives);

        assert!(report.contains("No hypotheses were generated"));
        assert!(report.contains("No low-CTR campaigns found"));
        assert!(report.contains("*Timestamp: N/A*"));
    }

    #[test]
    fn test_report_display_streams_into_any_writer() {
        use std::fmt::Write as _;

        let insights = insights(&[0.7]);
        let creatives = CreativeSet::empty("", None);
        let report = Report {
            query: "Why did CTR fall?",
            insights: &insights,
            creatives: &creatives,
        };

        let mut out = String::from("> preface\n");
        write!(out, "{report}").unwrap();

        assert!(out.starts_with("> preface\n# Facebook Ads Performance Analysis Report\n"));
        assert!(out.ends_with("*Timestamp: 2024-03-01T09:00:00Z*\n"));
        assert_eq!(
            out.trim_start_matches("> preface\n"),
            render_report("Why did CTR fall?", &insights, &creatives)
        );
    }
}
