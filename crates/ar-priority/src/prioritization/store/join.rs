use super::parser::{ClientTierRow, RiskRow, TransactionRow};
use super::status::{resolve_invoice_status, StatusColumns, StatusLayout};
use super::SourceRelations;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// One ops item paired with at most one transaction, risk record and tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinedRow {
    pub ops_item_id: String,
    pub item_type: Option<String>,
    pub owner: Option<String>,
    pub sla_due: Option<String>,
    pub age_days: Option<f64>,
    pub transaction_id: Option<String>,
    pub client_id: Option<String>,
    pub invoice_id: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<String>,
    pub status: StatusColumns,
    pub missing_fields: Option<f64>,
    pub dup_flag: Option<f64>,
    pub error_rate_by_client: Option<f64>,
    pub blocks_invoicing: Option<f64>,
    pub client_name: Option<String>,
    pub tier: Option<String>,
}

impl JoinedRow {
    pub fn invoice_status(&self) -> String {
        resolve_invoice_status(&self.status)
    }
}

/// Denormalized item table, in ops order then transaction order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinedTable {
    pub status_layout: StatusLayout,
    pub rows: Vec<JoinedRow>,
}

impl JoinedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `ops ⟕ transactions ⟕ risk` on `ops_item_id`, then `⟕ clients` on `client_id`.
pub fn join(relations: &SourceRelations) -> JoinedTable {
    let mut transactions_by_ops: HashMap<&str, Vec<&TransactionRow>> = HashMap::new();
    for transaction in &relations.transactions {
        if let Some(ops_item_id) = transaction.ops_item_id.as_deref() {
            transactions_by_ops
                .entry(ops_item_id)
                .or_default()
                .push(transaction);
        }
    }

    let risk_by_ops = index_first(
        "risk",
        relations
            .risk_flags
            .iter()
            .map(|row| (row.ops_item_id.as_str(), row)),
    );
    let tiers_by_client = index_first(
        "client tier",
        relations
            .client_tiers
            .iter()
            .map(|row| (row.client_id.as_str(), row)),
    );

    let layout = relations.status_layout;
    let mut rows = Vec::with_capacity(relations.ops_items.len());

    for ops in &relations.ops_items {
        let risk: Option<&RiskRow> = risk_by_ops.get(ops.ops_item_id.as_str()).copied();
        let matches = transactions_by_ops
            .get(ops.ops_item_id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let base = JoinedRow {
            ops_item_id: ops.ops_item_id.clone(),
            item_type: ops.item_type.clone(),
            owner: ops.owner.clone(),
            sla_due: ops.sla_due.clone(),
            age_days: ops.age_days,
            missing_fields: risk.and_then(|row| row.missing_fields),
            dup_flag: risk.and_then(|row| row.dup_flag),
            error_rate_by_client: risk.and_then(|row| row.error_rate_by_client),
            blocks_invoicing: risk.and_then(|row| row.blocks_invoicing),
            status: StatusColumns::from_layout(layout, ops.status.clone(), None),
            ..JoinedRow::default()
        };

        if matches.is_empty() {
            rows.push(base);
            continue;
        }

        for transaction in matches {
            let tier: Option<&ClientTierRow> = transaction
                .client_id
                .as_deref()
                .and_then(|client_id| tiers_by_client.get(client_id).copied());

            rows.push(JoinedRow {
                transaction_id: transaction.transaction_id.clone(),
                client_id: transaction.client_id.clone(),
                invoice_id: transaction.invoice_id.clone(),
                amount: transaction.amount,
                due_date: transaction.due_date.clone(),
                status: StatusColumns::from_layout(
                    layout,
                    ops.status.clone(),
                    transaction.status.clone(),
                ),
                client_name: tier.and_then(|row| row.client_name.clone()),
                tier: tier.and_then(|row| row.tier.clone()),
                ..base.clone()
            });
        }
    }

    debug!(rows = rows.len(), ?layout, "joined source relations");
    JoinedTable {
        status_layout: layout,
        rows,
    }
}

/// Keys of a 1:1 relation; repeats keep the first record.
fn index_first<'a, T>(
    relation: &'static str,
    entries: impl Iterator<Item = (&'a str, &'a T)>,
) -> HashMap<&'a str, &'a T> {
    let mut index = HashMap::new();
    for (key, row) in entries {
        if index.contains_key(key) {
            warn!(relation, key, "duplicate key in one-to-one relation, keeping first");
            continue;
        }
        index.insert(key, row);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prioritization::store::{ClientTierRow, OpsItemRow};

    fn ops(id: &str) -> OpsItemRow {
        OpsItemRow {
            ops_item_id: id.to_string(),
            status: Some("open".to_string()),
            ..OpsItemRow::default()
        }
    }

    fn transaction(id: &str, ops_item_id: Option<&str>, client_id: &str) -> TransactionRow {
        TransactionRow {
            transaction_id: Some(id.to_string()),
            ops_item_id: ops_item_id.map(str::to_string),
            client_id: Some(client_id.to_string()),
            invoice_id: Some(format!("INV-{id}")),
            amount: Some(1000.0),
            status: Some("overdue".to_string()),
            ..TransactionRow::default()
        }
    }

    #[test]
    fn preserves_every_ops_item_and_duplicates_on_multiple_transactions() {
        let relations = SourceRelations {
            ops_items: vec![ops("OP-1"), ops("OP-2")],
            transactions: vec![
                transaction("T-1", Some("OP-1"), "C1"),
                transaction("T-2", Some("OP-1"), "C2"),
                transaction("T-3", None, "C1"),
            ],
            client_tiers: vec![ClientTierRow {
                client_id: "C1".to_string(),
                client_name: Some("Client 1".to_string()),
                tier: Some("A".to_string()),
            }],
            ..SourceRelations::default()
        };

        let table = join(&relations);
        let ids: Vec<_> = table
            .rows
            .iter()
            .map(|row| (row.ops_item_id.as_str(), row.transaction_id.as_deref()))
            .collect();
        assert_eq!(
            ids,
            vec![("OP-1", Some("T-1")), ("OP-1", Some("T-2")), ("OP-2", None)]
        );

        assert_eq!(table.rows[0].tier.as_deref(), Some("A"));
        assert!(table.rows[1].tier.is_none(), "C2 has no tier record");
        assert!(table.rows[2].amount.is_none());
        assert_eq!(table.rows[0].invoice_status(), "overdue");
        assert_eq!(table.rows[2].invoice_status(), "open");
    }

    #[test]
    fn duplicate_risk_records_keep_the_first() {
        let relations = SourceRelations {
            ops_items: vec![ops("OP-1")],
            risk_flags: vec![
                RiskRow {
                    ops_item_id: "OP-1".to_string(),
                    missing_fields: Some(2.0),
                    ..RiskRow::default()
                },
                RiskRow {
                    ops_item_id: "OP-1".to_string(),
                    missing_fields: Some(9.0),
                    ..RiskRow::default()
                },
            ],
            ..SourceRelations::default()
        };

        let table = join(&relations);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].missing_fields, Some(2.0));
    }

    #[test]
    fn single_status_column_stays_unqualified() {
        let relations = SourceRelations {
            ops_items: vec![OpsItemRow {
                ops_item_id: "OP-1".to_string(),
                ..OpsItemRow::default()
            }],
            transactions: vec![transaction("T-1", Some("OP-1"), "C1")],
            status_layout: StatusLayout::TransactionsOnly,
            ..SourceRelations::default()
        };

        let table = join(&relations);
        let status = &table.rows[0].status;
        assert_eq!(status.status.as_deref(), Some("overdue"));
        assert!(status.status_x.is_none() && status.status_y.is_none());
        assert_eq!(table.rows[0].invoice_status(), "overdue");
    }

    #[test]
    fn collided_status_reads_only_the_transaction_side() {
        let relations = SourceRelations {
            ops_items: vec![
                OpsItemRow {
                    status: Some("overdue".to_string()),
                    ..ops("OP-1")
                },
                OpsItemRow {
                    status: Some("escalated".to_string()),
                    ..ops("OP-2")
                },
            ],
            transactions: vec![TransactionRow {
                status: None,
                ..transaction("T-2", Some("OP-2"), "C1")
            }],
            status_layout: StatusLayout::Collided,
            ..SourceRelations::default()
        };

        let table = join(&relations);
        assert_eq!(table.rows[0].status.status_x.as_deref(), Some("overdue"));
        assert_eq!(table.rows[0].invoice_status(), "open");
        assert_eq!(table.rows[1].transaction_id.as_deref(), Some("T-2"));
        assert_eq!(table.rows[1].invoice_status(), "open");
    }
}
