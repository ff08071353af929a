//! Composite investment scoring.
//!
//! Safety carries 60% of the index and convenience 40%. Inputs are expected
//! on a 0-10 scale but are not clamped; out-of-range values flow through the
//! arithmetic unchanged.

use crate::domain::model::{InvestmentAnalysis, Recommendation, RiskLevel};
use crate::domain::ports::RatingSource;
use crate::utils::error::Result;

pub const SAFETY_WEIGHT: f64 = 0.6;
pub const CONVENIENCE_WEIGHT: f64 = 0.4;

/// Evaluated top-down, inclusive lower bounds; anything below is `Poor`.
pub const RECOMMENDATION_TIERS: [(f64, Recommendation); 3] = [
    (8.5, Recommendation::Excellent),
    (7.0, Recommendation::Good),
    (5.0, Recommendation::Fair),
];

/// Both inputs must reach the bound; the weaker dimension decides.
pub const RISK_TIERS: [(f64, RiskLevel); 2] = [(7.0, RiskLevel::Low), (4.0, RiskLevel::Medium)];

pub const STRENGTH_THRESHOLD: f64 = 8.0;
pub const CONCERN_THRESHOLD: f64 = 4.0;

// 浮點誤差容忍, 例如 7.0 * 0.6 + 7.0 * 0.4
const TIER_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Safety,
    Convenience,
}

impl Dimension {
    fn label(self) -> &'static str {
        match self {
            Dimension::Safety => "safety",
            Dimension::Convenience => "convenience",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvestmentScorer {
    safety_weight: f64,
    convenience_weight: f64,
}

impl Default for InvestmentScorer {
    fn default() -> Self {
        Self {
            safety_weight: SAFETY_WEIGHT,
            convenience_weight: CONVENIENCE_WEIGHT,
        }
    }
}

impl InvestmentScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self, safety_rating: f64, convenience_score: f64) -> f64 {
        safety_rating * self.safety_weight + convenience_score * self.convenience_weight
    }

    pub fn score(&self, safety_rating: f64, convenience_score: f64) -> InvestmentAnalysis {
        let investment_index = self.index(safety_rating, convenience_score);
        let recommendation = recommendation_for(investment_index);
        let risk_level = risk_for(safety_rating, convenience_score);

        let weaker = if safety_rating <= convenience_score {
            (Dimension::Safety, safety_rating)
        } else {
            (Dimension::Convenience, convenience_score)
        };
        let stronger = if safety_rating >= convenience_score {
            (Dimension::Safety, safety_rating)
        } else {
            (Dimension::Convenience, convenience_score)
        };

        InvestmentAnalysis {
            safety_rating,
            convenience_score,
            safety_weight: self.safety_weight,
            convenience_weight: self.convenience_weight,
            investment_index,
            risk_level,
            recommendation,
            explanation: explanation(investment_index, recommendation, stronger, weaker),
            key_strengths: key_strengths(safety_rating, convenience_score),
            potential_concerns: potential_concerns(safety_rating, convenience_score),
            investment_advice: advice(recommendation, risk_level, weaker.0),
        }
    }

    /// Look the area up in `source` and score it; `None` if the source has no ratings.
    pub async fn score_area(
        &self,
        source: &dyn RatingSource,
        area_code: &str,
    ) -> Result<Option<InvestmentAnalysis>> {
        let Some(ratings) = source.fetch(area_code).await? else {
            tracing::warn!("⚠️ No ratings available for area {}", area_code);
            return Ok(None);
        };

        Ok(Some(
            self.score(ratings.safety_rating, ratings.convenience_score),
        ))
    }
}

pub fn score(safety_rating: f64, convenience_score: f64) -> InvestmentAnalysis {
    InvestmentScorer::new().score(safety_rating, convenience_score)
}

pub fn recommendation_for(index: f64) -> Recommendation {
    RECOMMENDATION_TIERS
        .iter()
        .find(|(threshold, _)| index + TIER_EPSILON >= *threshold)
        .map(|(_, tier)| *tier)
        .unwrap_or(Recommendation::Poor)
}

pub fn risk_for(safety_rating: f64, convenience_score: f64) -> RiskLevel {
    let weakest = safety_rating.min(convenience_score);
    RISK_TIERS
        .iter()
        .find(|(threshold, _)| weakest >= *threshold)
        .map(|(_, level)| *level)
        .unwrap_or(RiskLevel::High)
}

fn key_strengths(safety_rating: f64, convenience_score: f64) -> Vec<String> {
    let mut strengths = Vec::new();
    if safety_rating >= STRENGTH_THRESHOLD {
        strengths.push(format!(
            "Strong safety rating ({:.1}/10) with low relative crime exposure",
            safety_rating
        ));
    }
    if convenience_score >= STRENGTH_THRESHOLD {
        strengths.push(format!(
            "Excellent convenience ({:.1}/10) with good access to services and transport",
            convenience_score
        ));
    }
    if strengths.is_empty() {
        strengths.push("No standout strengths; ratings sit in the middle of the range".to_string());
    }
    strengths
}

fn potential_concerns(safety_rating: f64, convenience_score: f64) -> Vec<String> {
    let mut concerns = Vec::new();
    if safety_rating <= CONCERN_THRESHOLD {
        concerns.push(format!(
            "Low safety rating ({:.1}/10) may weigh on tenant demand and capital growth",
            safety_rating
        ));
    }
    if convenience_score <= CONCERN_THRESHOLD {
        concerns.push(format!(
            "Limited convenience ({:.1}/10) with weaker access to amenities",
            convenience_score
        ));
    }
    if concerns.is_empty() {
        concerns.push("No significant concerns identified from safety or convenience".to_string());
    }
    concerns
}

fn explanation(
    index: f64,
    recommendation: Recommendation,
    stronger: (Dimension, f64),
    weaker: (Dimension, f64),
) -> String {
    let summary = format!(
        "Investment index {:.1}/10 ({}), weighting safety {:.0}% and convenience {:.0}%.",
        index,
        recommendation,
        SAFETY_WEIGHT * 100.0,
        CONVENIENCE_WEIGHT * 100.0
    );

    if stronger.1 == weaker.1 {
        format!(
            "{} Safety and convenience are evenly matched at {:.1}/10.",
            summary, stronger.1
        )
    } else {
        format!(
            "{} The score is led by {} ({:.1}/10) and held back by {} ({:.1}/10).",
            summary,
            stronger.0.label(),
            stronger.1,
            weaker.0.label(),
            weaker.1
        )
    }
}

fn advice(recommendation: Recommendation, risk: RiskLevel, weaker: Dimension) -> String {
    let base = match recommendation {
        Recommendation::Excellent => "Strong candidate for long-term investment",
        Recommendation::Good => "Solid option worth shortlisting",
        Recommendation::Fair => "Proceed with caution and compare against nearby suburbs",
        Recommendation::Poor => "Not recommended without a clear value or redevelopment angle",
    };

    match risk {
        RiskLevel::Low => format!("{}; both dimensions are healthy.", base),
        RiskLevel::Medium | RiskLevel::High => format!(
            "{}; review {} trends before committing ({} risk).",
            base,
            weaker.label(),
            risk.as_str().to_lowercase()
        ),
    }
}
