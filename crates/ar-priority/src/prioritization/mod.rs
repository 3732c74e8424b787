//! Cashflow-aware prioritization of AR follow-up work.
//!
//! Data flows one way: the [`store`] joins the four source relations, the
//! [`normalize`] step derives typed fields relative to an evaluation date,
//! [`scoring`] rescales and blends the four signals under [`PolicyWeights`],
//! and [`report`] ranks and summarizes the result.

pub mod domain;
pub mod normalize;
pub mod report;
pub mod scale;
pub mod scoring;
pub mod store;

pub use domain::{AgingBucket, ClientTier};
pub use scoring::{PolicyWeights, ScoredItem, Signal, WeightError};
pub use store::{CachedRecordStore, JoinedTable, LoadError, SourceRelations};

use chrono::NaiveDate;
use report::views::{WorklistRow, WorklistSummary};
use scoring::CompositeScorer;
use std::io::Write;
use tracing::info;

/// Ranked, scored items for one evaluation date and one set of weights.
#[derive(Debug, Clone)]
pub struct Worklist {
    today: NaiveDate,
    weights: PolicyWeights,
    exception_rate: f64,
    items: Vec<ScoredItem>,
}

impl Worklist {
    pub fn compute(table: &JoinedTable, weights: PolicyWeights, today: NaiveDate) -> Self {
        let normalized = normalize::normalize_table(table, today);
        let exception_rate = normalize::exception_rate(&normalized);
        let scored = CompositeScorer::new(weights).score(normalized);
        let items = report::rank(scored);

        info!(
            %today,
            items = items.len(),
            transaction_w = weights.transaction(),
            ops_w = weights.ops(),
            data_w = weights.data(),
            client_w = weights.client(),
            "computed priority worklist"
        );

        Self {
            today,
            weights,
            exception_rate,
            items,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn weights(&self) -> &PolicyWeights {
        &self.weights
    }

    pub fn exception_rate(&self) -> f64 {
        self.exception_rate
    }

    /// Every item, highest priority first.
    pub fn items(&self) -> &[ScoredItem] {
        &self.items
    }

    pub fn top(&self, n: usize) -> &[ScoredItem] {
        &self.items[..n.min(self.items.len())]
    }

    pub fn rows(&self, n: usize) -> Vec<WorklistRow> {
        self.top(n).iter().map(WorklistRow::from_scored).collect()
    }

    pub fn summary(&self, top_n: usize) -> WorklistSummary {
        report::build_summary(&self.items, self.exception_rate, top_n)
    }

    pub fn write_csv<W: Write>(&self, top_n: usize, writer: W) -> Result<(), csv::Error> {
        report::write_worklist_csv(&self.rows(top_n), writer)
    }
}
