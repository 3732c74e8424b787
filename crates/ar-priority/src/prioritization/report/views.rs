use super::format::{format_currency, format_percent};
use crate::prioritization::domain::AgingBucket;
use crate::prioritization::scoring::{ScoredItem, Signal};
use serde::Serialize;

/// Exported worklist columns, in header order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorklistRow {
    pub ops_item_id: String,
    pub client_id: Option<String>,
    pub invoice_id: Option<String>,
    pub amount: f64,
    pub invoice_status: String,
    pub blocks_invoicing: u8,
    pub priority_score: f64,
}

impl WorklistRow {
    pub const HEADERS: [&'static str; 7] = [
        "ops_item_id",
        "client_id",
        "invoice_id",
        "amount",
        "invoice_status",
        "blocks_invoicing",
        "priority_score",
    ];

    pub fn from_scored(scored: &ScoredItem) -> Self {
        Self {
            ops_item_id: scored.item.ops_item_id.clone(),
            client_id: scored.item.client_id.clone(),
            invoice_id: scored.item.invoice_id.clone(),
            amount: scored.item.amount,
            invoice_status: scored.item.invoice_status.clone(),
            blocks_invoicing: scored.item.blocks_invoicing,
            priority_score: scored.priority_score,
        }
    }
}

/// Ranked row plus the signal that drove its score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedItemView {
    pub rank: usize,
    #[serde(flatten)]
    pub row: WorklistRow,
    pub aging_bucket: &'static str,
    pub dominant_signal: Signal,
    pub dominant_signal_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioTotals {
    pub total_amount: f64,
    pub item_count: usize,
    pub overdue_amount: f64,
    pub blocked_amount: f64,
    pub pct_overdue: f64,
    pub exception_rate: f64,
}

impl PortfolioTotals {
    pub fn formatted(&self) -> FormattedTotals {
        FormattedTotals {
            total_amount: format_currency(self.total_amount),
            overdue_amount: format_currency(self.overdue_amount),
            blocked_amount: format_currency(self.blocked_amount),
            pct_overdue: format_percent(self.pct_overdue),
            exception_rate: format_percent(self.exception_rate),
        }
    }
}

/// Display strings for the metric cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedTotals {
    pub total_amount: String,
    pub overdue_amount: String,
    pub blocked_amount: String,
    pub pct_overdue: String,
    pub exception_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgingSummaryEntry {
    pub bucket: AgingBucket,
    pub bucket_label: &'static str,
    pub amount: f64,
    /// Rows in the bucket carrying an invoice id.
    pub count: usize,
}

/// How much of the queue the top of the worklist covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopConcentration {
    pub top_n: usize,
    pub count: usize,
    pub amount: f64,
    pub pct_count: f64,
    pub pct_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorklistSummary {
    pub totals: PortfolioTotals,
    pub formatted: FormattedTotals,
    pub aging: Vec<AgingSummaryEntry>,
    pub concentration: TopConcentration,
    pub top_items: Vec<RankedItemView>,
}
