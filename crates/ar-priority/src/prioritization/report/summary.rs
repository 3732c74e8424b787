use super::views::{
    AgingSummaryEntry, PortfolioTotals, RankedItemView, TopConcentration, WorklistRow,
    WorklistSummary,
};
use crate::prioritization::domain::AgingBucket;
use crate::prioritization::scoring::ScoredItem;
use std::collections::HashMap;

pub fn portfolio_totals(items: &[ScoredItem], exception_rate: f64) -> PortfolioTotals {
    let total_amount = items.iter().map(|entry| entry.item.amount).sum();
    let overdue_amount = items
        .iter()
        .filter(|entry| entry.item.overdue())
        .map(|entry| entry.item.amount)
        .sum();
    let blocked_amount = items
        .iter()
        .filter(|entry| entry.item.blocked())
        .map(|entry| entry.item.amount)
        .sum();
    let overdue_count = items.iter().filter(|entry| entry.item.overdue()).count();

    PortfolioTotals {
        total_amount,
        item_count: items.len(),
        overdue_amount,
        blocked_amount,
        pct_overdue: percentage(overdue_count as f64, items.len() as f64),
        exception_rate,
    }
}

/// Buckets in Current → 90+ order; buckets without rows are left out.
pub fn aging_summary(items: &[ScoredItem]) -> Vec<AgingSummaryEntry> {
    let mut by_bucket: HashMap<AgingBucket, (f64, usize)> = HashMap::new();
    for entry in items {
        let slot = by_bucket.entry(entry.item.aging_bucket).or_default();
        slot.0 += entry.item.amount;
        if entry.item.invoice_id.is_some() {
            slot.1 += 1;
        }
    }

    AgingBucket::ordered()
        .into_iter()
        .filter_map(|bucket| {
            by_bucket
                .get(&bucket)
                .map(|(amount, count)| AgingSummaryEntry {
                    bucket,
                    bucket_label: bucket.label(),
                    amount: *amount,
                    count: *count,
                })
        })
        .collect()
}

/// `ranked` must already be in worklist order.
pub fn top_concentration(ranked: &[ScoredItem], top_n: usize) -> TopConcentration {
    let top = &ranked[..top_n.min(ranked.len())];
    let amount: f64 = top.iter().map(|entry| entry.item.amount).sum();
    let total_amount: f64 = ranked.iter().map(|entry| entry.item.amount).sum();

    TopConcentration {
        top_n,
        count: top.len(),
        amount,
        pct_count: percentage(top.len() as f64, ranked.len() as f64),
        pct_amount: percentage(amount, total_amount),
    }
}

pub fn ranked_views(ranked: &[ScoredItem], top_n: usize) -> Vec<RankedItemView> {
    ranked
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(index, entry)| {
            let dominant = entry.breakdown.dominant_signal();
            RankedItemView {
                rank: index + 1,
                row: WorklistRow::from_scored(entry),
                aging_bucket: entry.item.aging_bucket.label(),
                dominant_signal: dominant,
                dominant_signal_label: dominant.label(),
            }
        })
        .collect()
}

pub fn build_summary(ranked: &[ScoredItem], exception_rate: f64, top_n: usize) -> WorklistSummary {
    let totals = portfolio_totals(ranked, exception_rate);
    WorklistSummary {
        formatted: totals.formatted(),
        totals,
        aging: aging_summary(ranked),
        concentration: top_concentration(ranked, top_n),
        top_items: ranked_views(ranked, top_n),
    }
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
