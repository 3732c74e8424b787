mod weights;

pub use weights::{PolicyWeights, Signal, WeightError};

use super::domain::BLOCKS_INVOICING_PENALTY;
use super::normalize::NormalizedItem;
use super::scale::scale_by;
use serde::Serialize;

/// One value per blended signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ComponentSignals {
    pub transaction: f64,
    pub ops: f64,
    pub data: f64,
    pub client: f64,
}

impl ComponentSignals {
    pub fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Transaction => self.transaction,
            Signal::Ops => self.ops,
            Signal::Data => self.data,
            Signal::Client => self.client,
        }
    }

    pub fn weighted(&self, weights: &PolicyWeights) -> Self {
        Self {
            transaction: self.transaction * weights.transaction(),
            ops: self.ops * weights.ops(),
            data: self.data * weights.data(),
            client: self.client * weights.client(),
        }
    }

    pub fn sum(&self) -> f64 {
        self.transaction + self.ops + self.data + self.client
    }
}

/// How an item's score was assembled, from raw fields to weighted terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub scaled_amount: f64,
    pub scaled_age_days: f64,
    pub raw: ComponentSignals,
    pub scaled: ComponentSignals,
    pub weighted: ComponentSignals,
}

impl ScoreBreakdown {
    /// Signal contributing the most to the final score.
    pub fn dominant_signal(&self) -> Signal {
        Signal::ordered()
            .into_iter()
            .fold(Signal::Transaction, |best, signal| {
                if self.weighted.get(signal) > self.weighted.get(best) {
                    signal
                } else {
                    best
                }
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: NormalizedItem,
    pub breakdown: ScoreBreakdown,
    pub priority_score: f64,
}

/// Raw components before their own scaling pass. The transaction and ops
/// components mix a 0/100 flag with an already-scaled field.
pub fn raw_components(
    item: &NormalizedItem,
    scaled_amount: f64,
    scaled_age_days: f64,
) -> ComponentSignals {
    ComponentSignals {
        transaction: item.is_overdue + scaled_amount,
        ops: item.sla_risk + scaled_age_days,
        data: f64::from(item.blocks_invoicing) * BLOCKS_INVOICING_PENALTY + item.missing_fields,
        client: item.tier_raw_score,
    }
}

/// Stateless scorer applying one set of policy weights to a batch of items.
/// Scaling is relative to the batch, so scores are only comparable within
/// the batch they were computed in.
#[derive(Debug, Clone, Copy)]
pub struct CompositeScorer {
    weights: PolicyWeights,
}

impl CompositeScorer {
    pub fn new(weights: PolicyWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, items: Vec<NormalizedItem>) -> Vec<ScoredItem> {
        let scaled_amount = scale_by(&items, |item| item.amount);
        let scaled_age_days = scale_by(&items, |item| item.age_days);

        let raw: Vec<ComponentSignals> = items
            .iter()
            .zip(scaled_amount.iter().zip(&scaled_age_days))
            .map(|(item, (amount, age))| raw_components(item, *amount, *age))
            .collect();

        let scaled_transaction = scale_by(&raw, |signals| signals.transaction);
        let scaled_ops = scale_by(&raw, |signals| signals.ops);
        let scaled_data = scale_by(&raw, |signals| signals.data);
        let scaled_client = scale_by(&raw, |signals| signals.client);

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let scaled = ComponentSignals {
                    transaction: scaled_transaction[index],
                    ops: scaled_ops[index],
                    data: scaled_data[index],
                    client: scaled_client[index],
                };
                let weighted = scaled.weighted(&self.weights);
                ScoredItem {
                    item,
                    priority_score: weighted.sum(),
                    breakdown: ScoreBreakdown {
                        scaled_amount: scaled_amount[index],
                        scaled_age_days: scaled_age_days[index],
                        raw: raw[index],
                        scaled,
                        weighted,
                    },
                }
            })
            .collect()
    }
}
