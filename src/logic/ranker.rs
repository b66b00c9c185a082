use super::catalog::Catalog;
use super::evaluator::{self, Evaluation};
use super::season::ActiveSeasons;
use crate::models::{CropSuggestion, CropTemplate, CropType, CurrentConditions, Season};
use std::sync::Arc;

/// Filtering and truncation knobs for a ranking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPolicy {
    pub inclusion_threshold: u8,
    pub max_suggestions: usize,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            inclusion_threshold: 50,
            max_suggestions: 8,
        }
    }
}

/// Whether the season gate lets this crop through.
pub fn is_eligible(template: &CropTemplate, active: &ActiveSeasons) -> bool {
    !template.is_gated() || active.any_of(&template.seasons)
}

/// Season type and label text for a crop in the given month.
pub fn resolve_season(
    template: &CropTemplate,
    active: &ActiveSeasons,
) -> (CropType, Option<Season>, String) {
    let preferred = active.preferred(&template.seasons);
    let resolved = preferred.or_else(|| template.seasons.last().copied());

    let crop_type = match resolved {
        Some(season) if !template.perennial => CropType::from(season),
        _ => CropType::Perennial,
    };

    let variant_label = resolved
        .and_then(|s| template.variants.get(&s))
        .and_then(|v| v.season.clone());

    let off_season_label = preferred
        .is_none()
        .then(|| template.off_season.clone())
        .flatten();

    let label = off_season_label
        .or(variant_label)
        .or_else(|| template.details.season.clone())
        .or_else(|| resolved.map(|s| s.label()))
        .unwrap_or_else(|| "Year-round".to_string());

    (crop_type, resolved, label)
}

/// Rank the catalog with the default policy.
pub fn rank(
    catalog: &[CropTemplate],
    conditions: &CurrentConditions,
    month: u32,
) -> Vec<CropSuggestion> {
    rank_with(catalog, conditions, month, &RankingPolicy::default())
}

pub fn rank_with(
    catalog: &[CropTemplate],
    conditions: &CurrentConditions,
    month: u32,
    policy: &RankingPolicy,
) -> Vec<CropSuggestion> {
    let active = ActiveSeasons::for_month(month);

    let mut suggestions: Vec<CropSuggestion> = catalog
        .iter()
        .filter(|template| is_eligible(template, &active))
        .filter_map(|template| {
            let rain = template.rain.resolve(active.kharif);
            let evaluation = evaluator::evaluate(&template.envelope, rain, conditions);

            if evaluation.confidence < policy.inclusion_threshold {
                return None;
            }
            if let Some(gate) = &template.extra_gate {
                if !gate.allows(conditions) {
                    return None;
                }
            }

            Some(build_suggestion(template, &active, rain, conditions, evaluation))
        })
        .collect();

    // Stable: ties keep catalog order.
    suggestions.sort_by(|a, b| {
        b.suitability
            .rank()
            .cmp(&a.suitability.rank())
            .then(b.confidence.cmp(&a.confidence))
    });
    suggestions.truncate(policy.max_suggestions);

    suggestions
}

fn build_suggestion(
    template: &CropTemplate,
    active: &ActiveSeasons,
    rain: Option<bool>,
    conditions: &CurrentConditions,
    evaluation: Evaluation,
) -> CropSuggestion {
    let (crop_type, resolved, season) = resolve_season(template, active);
    let variant = resolved.and_then(|s| template.variants.get(&s));
    let details = &template.details;

    let sowing_time = variant
        .and_then(|v| v.sowing_time.clone())
        .unwrap_or_else(|| details.sowing_time.clone());
    let harvest_time = variant
        .and_then(|v| v.harvest_time.clone())
        .unwrap_or_else(|| details.harvest_time.clone());

    CropSuggestion {
        name: template.name.clone(),
        crop_type,
        suitability: evaluation.tier,
        confidence: evaluation.confidence,
        season,
        category: template.category,
        sowing_time,
        harvest_time,
        water_requirement: details.water_requirement,
        expected_yield: details.expected_yield.clone(),
        market_price: details.market_price.clone(),
        soil_requirement: details.soil_requirement.clone(),
        climate_requirement: details.climate_requirement.clone(),
        spacing: details.spacing.clone(),
        seeds: details.seeds.clone(),
        fertilizer: details.fertilizer.clone(),
        pest_management: details.pest_management.clone(),
        challenges: details.challenges.clone(),
        benefits: details.benefits.clone(),
        tips: details.tips.clone(),
        breakdown: evaluation.breakdown,
        rationale: evaluator::rationale(&template.envelope, rain, conditions),
    }
}

/// Shared, read-only advisor over one catalog.
#[derive(Debug, Clone)]
pub struct CropAdvisor {
    catalog: Arc<Catalog>,
    policy: RankingPolicy,
}

impl CropAdvisor {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            policy: RankingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RankingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> &RankingPolicy {
        &self.policy
    }

    pub fn suggest(&self, conditions: &CurrentConditions, month: u32) -> Vec<CropSuggestion> {
        if !conditions.is_finite() {
            tracing::warn!("Skipping crop ranking, conditions are not finite: {:?}", conditions);
            return Vec::new();
        }
        if self.policy == RankingPolicy::default() {
            rank(self.catalog.as_slice(), conditions, month)
        } else {
            rank_with(self.catalog.as_slice(), conditions, month, &self.policy)
        }
    }
}
