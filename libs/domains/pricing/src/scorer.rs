//! Candidate scoring
//!
//! Picks the single best catalog record for a resource out of a noisy candidate
//! list. Hard requirements (positive price, price type, unit) reject a record
//! outright; soft hints (exact names, patterns, preferred/avoided meter words)
//! add to or subtract from its score. The highest score wins, the cheaper record
//! wins a tie, and remaining ties fall back to a name ordering so the outcome
//! never depends on the order the catalog returned records in.

use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

use crate::models::{PriceRecord, PriceType};

/// Point values used by the scorer.
///
/// Only the ordering matters: exact name ≫ pattern match ≫ preferred keyword,
/// and an avoided keyword outweighs any combination of soft bonuses short of an
/// exact SKU match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub base: i32,
    pub exact_sku: i32,
    pub exact_meter: i32,
    pub pattern: i32,
    pub prefer: i32,
    pub avoid: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 10,
            exact_sku: 100,
            exact_meter: 50,
            pattern: 10,
            prefer: 5,
            avoid: 100,
        }
    }
}

/// Requirements and hints for one estimation
#[derive(Debug, Clone, Default)]
pub struct MatchCriteria {
    pub description: String,
    pub required_price_type: PriceType,
    pub required_unit: Option<String>,
    pub strict_unit_match: bool,
    pub product_name_pattern: Option<Regex>,
    pub sku_name_pattern: Option<Regex>,
    pub meter_name_pattern: Option<Regex>,
    pub exact_sku_name: Option<String>,
    pub exact_meter_name: Option<String>,
    pub prefer_contains_meter: Vec<String>,
    pub avoid_contains_meter: Vec<String>,
}

impl MatchCriteria {
    /// Criteria with default price type (Consumption); `description` is only used in logs
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn price_type(mut self, price_type: PriceType) -> Self {
        self.required_price_type = price_type;
        self
    }

    /// Unit must equal `unit` (case-insensitive)
    pub fn unit_exact(mut self, unit: impl Into<String>) -> Self {
        self.required_unit = Some(unit.into());
        self.strict_unit_match = true;
        self
    }

    /// Unit must contain `unit` (case-insensitive)
    pub fn unit_containing(mut self, unit: impl Into<String>) -> Self {
        self.required_unit = Some(unit.into());
        self.strict_unit_match = false;
        self
    }

    pub fn product_pattern(mut self, pattern: &str) -> Self {
        self.product_name_pattern = compile_pattern(pattern);
        self
    }

    pub fn sku_pattern(mut self, pattern: &str) -> Self {
        self.sku_name_pattern = compile_pattern(pattern);
        self
    }

    pub fn meter_pattern(mut self, pattern: &str) -> Self {
        self.meter_name_pattern = compile_pattern(pattern);
        self
    }

    pub fn exact_sku(mut self, sku_name: impl Into<String>) -> Self {
        self.exact_sku_name = Some(sku_name.into());
        self
    }

    pub fn exact_meter(mut self, meter_name: impl Into<String>) -> Self {
        self.exact_meter_name = Some(meter_name.into());
        self
    }

    pub fn prefer<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefer_contains_meter
            .extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn avoid<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.avoid_contains_meter
            .extend(keywords.into_iter().map(Into::into));
        self
    }
}

/// An invalid pattern is dropped (it can never award a bonus) rather than failing the estimation.
fn compile_pattern(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(pattern = pattern, error = %e, "Ignoring invalid match pattern");
            None
        }
    }
}

/// An eligible candidate with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub record: &'a PriceRecord,
    pub score: i32,
}

/// Why candidates fell out, for tuning filters when nothing matches
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RejectionStats {
    pub non_positive_price: usize,
    pub price_type: usize,
    pub unit: usize,
    pub non_positive_score: usize,
    pub product_pattern_miss: usize,
    pub sku_pattern_miss: usize,
    pub meter_pattern_miss: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateScorer {
    weights: ScoringWeights,
}

impl CandidateScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Best record for the criteria, or `None` when nothing is eligible.
    pub fn select_best<'a>(
        &self,
        candidates: &'a [PriceRecord],
        criteria: &MatchCriteria,
    ) -> Option<&'a PriceRecord> {
        if candidates.is_empty() {
            debug!(resource = %criteria.description, "No candidates to match");
            return None;
        }

        let (ranked, stats) = self.rank_with_stats(candidates, criteria);

        match ranked.first() {
            Some(best) => {
                debug!(
                    resource = %criteria.description,
                    score = best.score,
                    eligible = ranked.len(),
                    total = candidates.len(),
                    selected = %best.record.label(),
                    "Selected best price match"
                );
                for runner_up in ranked.iter().skip(1).take(5) {
                    trace!(
                        score = runner_up.score,
                        candidate = %runner_up.record.label(),
                        "Runner-up"
                    );
                }
                Some(best.record)
            }
            None => {
                warn!(
                    resource = %criteria.description,
                    total = candidates.len(),
                    rejected_price = stats.non_positive_price,
                    rejected_price_type = stats.price_type,
                    rejected_unit = stats.unit,
                    rejected_score = stats.non_positive_score,
                    product_pattern_miss = stats.product_pattern_miss,
                    sku_pattern_miss = stats.sku_pattern_miss,
                    meter_pattern_miss = stats.meter_pattern_miss,
                    "No suitable price candidate"
                );
                None
            }
        }
    }

    /// Eligible candidates in selection order (best first)
    pub fn rank<'a>(
        &self,
        candidates: &'a [PriceRecord],
        criteria: &MatchCriteria,
    ) -> Vec<ScoredCandidate<'a>> {
        self.rank_with_stats(candidates, criteria).0
    }

    pub fn rank_with_stats<'a>(
        &self,
        candidates: &'a [PriceRecord],
        criteria: &MatchCriteria,
    ) -> (Vec<ScoredCandidate<'a>>, RejectionStats) {
        let mut stats = RejectionStats::default();
        let required_type = criteria.required_price_type.to_string();
        let required_unit = criteria.required_unit.as_deref().map(str::to_lowercase);

        let mut ranked: Vec<ScoredCandidate<'a>> = Vec::new();

        for record in candidates {
            if !(record.retail_price > 0.0) {
                stats.non_positive_price += 1;
                continue;
            }

            if !record.price_type.eq_ignore_ascii_case(&required_type) {
                stats.price_type += 1;
                continue;
            }

            if let Some(unit) = &required_unit {
                let candidate_unit = record.unit_of_measure.to_lowercase();
                let unit_ok = if criteria.strict_unit_match {
                    candidate_unit.trim() == unit.trim()
                } else {
                    candidate_unit.contains(unit.as_str())
                };
                if !unit_ok {
                    stats.unit += 1;
                    continue;
                }
            }

            let score = self.score(record, criteria, &mut stats);
            if score <= 0 {
                stats.non_positive_score += 1;
                trace!(score, candidate = %record.label(), "Discarding non-positive score");
                continue;
            }

            ranked.push(ScoredCandidate { record, score });
        }

        ranked.sort_by(compare_candidates);
        (ranked, stats)
    }

    fn score(
        &self,
        record: &PriceRecord,
        criteria: &MatchCriteria,
        stats: &mut RejectionStats,
    ) -> i32 {
        let w = &self.weights;
        let mut score = w.base;

        if let Some(sku) = &criteria.exact_sku_name {
            if record.sku_name.eq_ignore_ascii_case(sku) {
                score += w.exact_sku;
            }
        }
        if let Some(meter) = &criteria.exact_meter_name {
            if record.meter_name.eq_ignore_ascii_case(meter) {
                score += w.exact_meter;
            }
        }

        let patterns = [
            (&criteria.product_name_pattern, &record.product_name, &mut stats.product_pattern_miss),
            (&criteria.sku_name_pattern, &record.sku_name, &mut stats.sku_pattern_miss),
            (&criteria.meter_name_pattern, &record.meter_name, &mut stats.meter_pattern_miss),
        ];
        for (pattern, field, misses) in patterns {
            if let Some(regex) = pattern {
                if regex.is_match(field) {
                    score += w.pattern;
                } else {
                    *misses += 1;
                }
            }
        }

        let meter = record.meter_name.to_lowercase();
        for keyword in &criteria.prefer_contains_meter {
            if !keyword.is_empty() && meter.contains(&keyword.to_lowercase()) {
                score += w.prefer;
            }
        }
        for keyword in &criteria.avoid_contains_meter {
            if !keyword.is_empty() && meter.contains(&keyword.to_lowercase()) {
                score -= w.avoid;
            }
        }

        score
    }
}

/// Highest score first, then cheapest, then a stable name ordering
fn compare_candidates(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.record.retail_price.total_cmp(&b.record.retail_price))
        .then_with(|| a.record.meter_name.cmp(&b.record.meter_name))
        .then_with(|| a.record.sku_name.cmp(&b.record.sku_name))
        .then_with(|| a.record.product_name.cmp(&b.record.product_name))
        .then_with(|| a.record.unit_of_measure.cmp(&b.record.unit_of_measure))
}

/// [`CandidateScorer::select_best`] with default weights
pub fn select_best<'a>(
    candidates: &'a [PriceRecord],
    criteria: &MatchCriteria,
) -> Option<&'a PriceRecord> {
    CandidateScorer::default().select_best(candidates, criteria)
}
