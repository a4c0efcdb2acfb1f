//! Gap analysis: an individual Tier-2 result against its team's averages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::team::averages::TeamAverages;
use crate::tier2::scoring::Tier2ScoreResult;
use crate::types::Pillar;

/// One compared figure. `delta` is individual minus team, so a positive
/// delta means the individual is ahead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub individual: Decimal,
    pub team: Decimal,
    pub delta: Decimal,
}

impl Gap {
    fn new(individual: Decimal, team: Decimal) -> Self {
        Gap {
            individual,
            team,
            delta: individual - team,
        }
    }
}

/// A dimension named within its pillar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRef {
    pub pillar: Pillar,
    pub dimension: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComparison {
    pub overall: Gap,
    pub weighted: Gap,
    /// Pillar percentage gaps, for pillars present on both sides.
    pub pillars: BTreeMap<Pillar, Gap>,
    /// Dimension percentage gaps, for dimensions present on both sides.
    pub dimensions: BTreeMap<Pillar, BTreeMap<String, Gap>>,
    /// Dimensions ordered from the largest shortfall to the largest lead.
    pub weakest_dimensions: Vec<DimensionRef>,
}

impl ScoreComparison {
    pub fn dimension(&self, pillar: Pillar, name: &str) -> Option<&Gap> {
        self.dimensions.get(&pillar)?.get(name)
    }
}

pub fn compare_to_team(individual: &Tier2ScoreResult, team: &TeamAverages) -> ScoreComparison {
    let pillars: BTreeMap<Pillar, Gap> = individual
        .pillar_scores
        .iter()
        .filter_map(|(pillar, score)| {
            team.pillars
                .get(pillar)
                .map(|avg| (*pillar, Gap::new(score.percentage, avg.percentage)))
        })
        .collect();

    let mut dimensions: BTreeMap<Pillar, BTreeMap<String, Gap>> = BTreeMap::new();
    let mut ranked: Vec<(Decimal, DimensionRef)> = Vec::new();
    for (pillar, name, score) in individual.dimensions() {
        let Some(avg) = team.dimension(pillar, name) else {
            continue;
        };
        let gap = Gap::new(score.percentage, avg.percentage);
        ranked.push((
            gap.delta,
            DimensionRef {
                pillar,
                dimension: name.to_string(),
            },
        ));
        dimensions
            .entry(pillar)
            .or_default()
            .insert(name.to_string(), gap);
    }

    // Equal deltas keep pillar-then-name order
    ranked.sort_by(|a, b| a.0.cmp(&b.0));
    let weakest_dimensions = ranked.into_iter().map(|(_, dim)| dim).collect();

    ScoreComparison {
        overall: Gap::new(
            Decimal::from(individual.normalized_shifted_score),
            team.overall_score,
        ),
        weighted: Gap::new(individual.weighted_score, team.stages.weighted_score),
        pillars,
        dimensions,
        weakest_dimensions,
    }
}
