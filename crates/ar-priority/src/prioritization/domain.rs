use serde::{Deserialize, Serialize};

/// Flag value carried by `is_overdue` and `sla_risk` when set; both live on
/// the same 0-100 band as the scaled signals.
pub const FLAG_SET: f64 = 100.0;

/// `days_to_sla` assigned when an item has no usable SLA date.
pub const NO_SLA_SENTINEL_DAYS: i64 = 999;

/// Data-quality weight of a billing hold relative to one missing field.
pub const BLOCKS_INVOICING_PENALTY: f64 = 5.0;

/// Invoice status that marks an item as past due.
pub const OVERDUE_STATUS: &str = "overdue";

/// Invoice status assumed when no source carries one.
pub const DEFAULT_STATUS: &str = "open";

/// Overdue-duration grouping used by the AR aging summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    Current,
    UpTo30,
    Days31To60,
    Days61To90,
    Over90,
}

impl AgingBucket {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Current,
            Self::UpTo30,
            Self::Days31To60,
            Self::Days61To90,
            Self::Over90,
        ]
    }

    /// Upper bounds are inclusive: 30 lands in `0-30 days`, 90 in `61-90 days`.
    pub const fn from_days_past_due(days: i64) -> Self {
        if days <= 0 {
            Self::Current
        } else if days <= 30 {
            Self::UpTo30
        } else if days <= 60 {
            Self::Days31To60
        } else if days <= 90 {
            Self::Days61To90
        } else {
            Self::Over90
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::UpTo30 => "0-30 days",
            Self::Days31To60 => "31-60 days",
            Self::Days61To90 => "61-90 days",
            Self::Over90 => "90+ days",
        }
    }
}

/// Client importance classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientTier {
    A,
    B,
    C,
}

impl ClientTier {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            _ => None,
        }
    }

    pub const fn raw_score(self) -> f64 {
        match self {
            Self::A => 3.0,
            Self::B => 2.0,
            Self::C => 1.0,
        }
    }

    /// Unknown or missing tiers rank with the lowest tier.
    pub fn raw_score_for(tier: Option<&str>) -> f64 {
        tier.and_then(Self::parse)
            .map(Self::raw_score)
            .unwrap_or(Self::C.raw_score())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aging_bucket_boundaries_are_inclusive() {
        assert_eq!(AgingBucket::from_days_past_due(0).label(), "Current");
        assert_eq!(AgingBucket::from_days_past_due(1).label(), "0-30 days");
        assert_eq!(AgingBucket::from_days_past_due(30).label(), "0-30 days");
        assert_eq!(AgingBucket::from_days_past_due(31).label(), "31-60 days");
        assert_eq!(AgingBucket::from_days_past_due(60).label(), "31-60 days");
        assert_eq!(AgingBucket::from_days_past_due(61).label(), "61-90 days");
        assert_eq!(AgingBucket::from_days_past_due(90).label(), "61-90 days");
        assert_eq!(AgingBucket::from_days_past_due(91).label(), "90+ days");
    }

    #[test]
    fn tier_scores_default_to_lowest() {
        assert_eq!(ClientTier::raw_score_for(Some("A")), 3.0);
        assert_eq!(ClientTier::raw_score_for(Some(" b ")), 2.0);
        assert_eq!(ClientTier::raw_score_for(Some("C")), 1.0);
        assert_eq!(ClientTier::raw_score_for(Some("Platinum")), 1.0);
        assert_eq!(ClientTier::raw_score_for(None), 1.0);
    }
}
