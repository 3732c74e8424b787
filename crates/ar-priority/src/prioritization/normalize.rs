use super::domain::{
    AgingBucket, ClientTier, FLAG_SET, NO_SLA_SENTINEL_DAYS, OVERDUE_STATUS,
};
use super::store::{JoinedRow, JoinedTable};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Cleaned, typed view of one joined row, relative to an evaluation date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedItem {
    pub ops_item_id: String,
    pub transaction_id: Option<String>,
    pub client_id: Option<String>,
    pub invoice_id: Option<String>,
    pub client_name: Option<String>,
    pub tier: Option<String>,
    pub invoice_status: String,
    pub amount: f64,
    pub due_date: Option<NaiveDate>,
    pub sla_due: Option<NaiveDate>,
    pub age_days: f64,
    pub missing_fields: f64,
    pub blocks_invoicing: u8,
    /// 100 when the invoice status is `overdue`, else 0.
    pub is_overdue: f64,
    pub days_past_due: i64,
    pub days_to_sla: i64,
    /// 100 when the SLA is due today or already missed, else 0.
    pub sla_risk: f64,
    pub aging_bucket: AgingBucket,
    pub has_exception: bool,
    pub tier_raw_score: f64,
}

impl NormalizedItem {
    pub fn overdue(&self) -> bool {
        self.is_overdue >= FLAG_SET
    }

    pub fn blocked(&self) -> bool {
        self.blocks_invoicing == 1
    }
}

pub fn normalize_row(row: &JoinedRow, today: NaiveDate) -> NormalizedItem {
    let invoice_status = row.invoice_status();
    let is_overdue = if invoice_status == OVERDUE_STATUS {
        FLAG_SET
    } else {
        0.0
    };

    let due_date = row.due_date.as_deref().and_then(parse_date);
    let days_past_due = days_past_due(due_date, today);

    let sla_due = row.sla_due.as_deref().and_then(parse_date);
    let days_to_sla = sla_due
        .map(|sla| (sla - today).num_days())
        .unwrap_or(NO_SLA_SENTINEL_DAYS);
    let sla_risk = if days_to_sla <= 0 { FLAG_SET } else { 0.0 };

    let blocks_invoicing = match row.blocks_invoicing {
        Some(flag) if flag != 0.0 => 1,
        _ => 0,
    };
    let missing_fields = row.missing_fields.unwrap_or(0.0);

    NormalizedItem {
        ops_item_id: row.ops_item_id.clone(),
        transaction_id: row.transaction_id.clone(),
        client_id: row.client_id.clone(),
        invoice_id: row.invoice_id.clone(),
        client_name: row.client_name.clone(),
        tier: row.tier.clone(),
        invoice_status,
        amount: row.amount.unwrap_or(0.0),
        due_date,
        sla_due,
        age_days: row.age_days.unwrap_or(0.0),
        missing_fields,
        blocks_invoicing,
        is_overdue,
        days_past_due,
        days_to_sla,
        sla_risk,
        aging_bucket: AgingBucket::from_days_past_due(days_past_due),
        has_exception: blocks_invoicing == 1 || missing_fields > 0.0,
        tier_raw_score: ClientTier::raw_score_for(row.tier.as_deref()),
    }
}

pub fn normalize_table(table: &JoinedTable, today: NaiveDate) -> Vec<NormalizedItem> {
    table
        .rows
        .iter()
        .map(|row| normalize_row(row, today))
        .collect()
}

/// Share of items with a billing hold or missing fields, as a percentage.
pub fn exception_rate(items: &[NormalizedItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let exceptions = items.iter().filter(|item| item.has_exception).count();
    exceptions as f64 / items.len() as f64 * 100.0
}

/// Whole days past due, never negative. Undated items are not past due.
pub fn days_past_due(due_date: Option<NaiveDate>, today: NaiveDate) -> i64 {
    due_date
        .map(|due| (today - due).num_days().max(0))
        .unwrap_or(0)
}

/// Lenient date parsing; anything unrecognized is treated as missing.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    NaiveDate::parse_from_str(trimmed, "%Y/%m/%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prioritization::store::StatusColumns;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 10).expect("valid date")
    }

    fn row() -> JoinedRow {
        JoinedRow {
            ops_item_id: "OP-001".to_string(),
            ..JoinedRow::default()
        }
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 5).unwrap();
        assert_eq!(parse_date("2025-11-05"), Some(expected));
        assert_eq!(parse_date("2025-11-05 00:00:00"), Some(expected));
        assert_eq!(parse_date("2025-11-05T08:30:00Z"), Some(expected));
        assert_eq!(parse_date("2025/11/05"), Some(expected));
        assert_eq!(parse_date("  "), None);
        assert_eq!(parse_date("next tuesday"), None);
        assert_eq!(parse_date("2025-13-40"), None);
    }

    #[test]
    fn empty_row_takes_null_defaults() {
        let item = normalize_row(&row(), today());

        assert_eq!(item.invoice_status, "open");
        assert_eq!(item.is_overdue, 0.0);
        assert_eq!(item.amount, 0.0);
        assert_eq!(item.days_past_due, 0);
        assert_eq!(item.days_to_sla, 999);
        assert_eq!(item.sla_risk, 0.0);
        assert_eq!(item.blocks_invoicing, 0);
        assert_eq!(item.missing_fields, 0.0);
        assert_eq!(item.age_days, 0.0);
        assert_eq!(item.aging_bucket, AgingBucket::Current);
        assert!(!item.has_exception);
        assert_eq!(item.tier_raw_score, 1.0);
    }

    #[test]
    fn unparseable_dates_flow_through_null_rules() {
        let item = normalize_row(
            &JoinedRow {
                due_date: Some("31/31/2025".to_string()),
                sla_due: Some("soon".to_string()),
                ..row()
            },
            today(),
        );

        assert!(item.due_date.is_none());
        assert_eq!(item.days_past_due, 0);
        assert_eq!(item.days_to_sla, 999);
        assert_eq!(item.sla_risk, 0.0);
    }

    #[test]
    fn derives_overdue_and_sla_flags() {
        let item = normalize_row(
            &JoinedRow {
                due_date: Some("2025-10-01".to_string()),
                sla_due: Some("2025-11-10".to_string()),
                status: StatusColumns {
                    status_y: Some("overdue".to_string()),
                    status_x: Some("open".to_string()),
                    ..StatusColumns::default()
                },
                ..row()
            },
            today(),
        );

        assert_eq!(item.is_overdue, 100.0);
        assert!(item.overdue());
        assert_eq!(item.days_past_due, 40);
        assert_eq!(item.aging_bucket, AgingBucket::Days31To60);
        assert_eq!(item.days_to_sla, 0);
        assert_eq!(item.sla_risk, 100.0);
    }

    #[test]
    fn future_due_dates_clip_to_zero_days_past_due() {
        let due = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(days_past_due(Some(due), today()), 0);
        assert_eq!(days_past_due(None, today()), 0);
    }

    #[test]
    fn exception_flag_follows_hold_or_missing_fields() {
        let blocked = normalize_row(
            &JoinedRow {
                blocks_invoicing: Some(1.0),
                missing_fields: Some(0.0),
                ..row()
            },
            today(),
        );
        assert!(blocked.has_exception);
        assert!(blocked.blocked());

        let clean = normalize_row(
            &JoinedRow {
                blocks_invoicing: Some(0.0),
                missing_fields: Some(0.0),
                ..row()
            },
            today(),
        );
        assert!(!clean.has_exception);

        let incomplete = normalize_row(
            &JoinedRow {
                missing_fields: Some(2.0),
                ..row()
            },
            today(),
        );
        assert!(incomplete.has_exception);

        let rate = exception_rate(&[blocked, clean, incomplete]);
        assert!((rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(exception_rate(&[]), 0.0);
    }
}
