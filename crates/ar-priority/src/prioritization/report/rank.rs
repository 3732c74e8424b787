use crate::prioritization::scoring::ScoredItem;
use std::cmp::Ordering;

/// Highest score first. Equal scores fall back to `ops_item_id` ascending,
/// then to input order.
pub fn rank(mut items: Vec<ScoredItem>) -> Vec<ScoredItem> {
    items.sort_by(compare);
    items
}

fn compare(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    b.priority_score
        .total_cmp(&a.priority_score)
        .then_with(|| a.item.ops_item_id.cmp(&b.item.ops_item_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prioritization::normalize::normalize_row;
    use crate::prioritization::scoring::{ComponentSignals, ScoreBreakdown};
    use crate::prioritization::store::JoinedRow;
    use chrono::NaiveDate;

    fn scored(ops_item_id: &str, transaction_id: &str, priority_score: f64) -> ScoredItem {
        let today = NaiveDate::from_ymd_opt(2025, 11, 10).expect("valid date");
        ScoredItem {
            item: normalize_row(
                &JoinedRow {
                    ops_item_id: ops_item_id.to_string(),
                    transaction_id: Some(transaction_id.to_string()),
                    ..JoinedRow::default()
                },
                today,
            ),
            breakdown: ScoreBreakdown {
                scaled_amount: 0.0,
                scaled_age_days: 0.0,
                raw: ComponentSignals::default(),
                scaled: ComponentSignals::default(),
                weighted: ComponentSignals::default(),
            },
            priority_score,
        }
    }

    #[test]
    fn orders_by_score_then_ops_item_then_input() {
        let ranked = rank(vec![
            scored("OP-003", "T-1", 40.0),
            scored("OP-002", "T-2", 75.5),
            scored("OP-001", "T-3", 40.0),
            scored("OP-003", "T-4", 40.0),
            scored("OP-004", "T-5", 12.0),
        ]);

        let order: Vec<_> = ranked
            .iter()
            .map(|entry| entry.item.transaction_id.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(order, vec!["T-2", "T-3", "T-1", "T-4", "T-5"]);
    }
}
