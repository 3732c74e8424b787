use serde::Serialize;
use std::fmt;
use tracing::warn;

/// The four blended signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Transaction,
    Ops,
    Data,
    Client,
}

impl Signal {
    pub const fn ordered() -> [Self; 4] {
        [Self::Transaction, Self::Ops, Self::Data, Self::Client]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Transaction => "Cash / transaction",
            Self::Ops => "Ops / SLA",
            Self::Data => "Data quality",
            Self::Client => "Client tier",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightError {
    #[error("{signal} weight must be between 0 and 1 (got {value})")]
    OutOfRange { signal: Signal, value: f64 },
}

/// Policy weights for one compute. The client weight is whatever the three
/// supplied weights leave of 1, floored at 0; supplied weights summing above
/// 1 are kept as-is, so the total may exceed 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyWeights {
    transaction_w: f64,
    ops_w: f64,
    data_w: f64,
    client_w: f64,
}

impl PolicyWeights {
    pub const DEFAULT_TRANSACTION: f64 = 0.4;
    pub const DEFAULT_OPS: f64 = 0.3;
    pub const DEFAULT_DATA: f64 = 0.2;

    pub fn new(transaction_w: f64, ops_w: f64, data_w: f64) -> Result<Self, WeightError> {
        check(Signal::Transaction, transaction_w)?;
        check(Signal::Ops, ops_w)?;
        check(Signal::Data, data_w)?;

        let supplied = transaction_w + ops_w + data_w;
        let client_w = (1.0 - supplied).max(0.0);
        if supplied > 1.0 {
            warn!(
                transaction_w,
                ops_w,
                data_w,
                "supplied weights exceed 1, client weight floored at 0"
            );
        }

        Ok(Self {
            transaction_w,
            ops_w,
            data_w,
            client_w,
        })
    }

    /// Falls back to the default for any weight not supplied.
    pub fn from_optional(
        transaction_w: Option<f64>,
        ops_w: Option<f64>,
        data_w: Option<f64>,
    ) -> Result<Self, WeightError> {
        Self::new(
            transaction_w.unwrap_or(Self::DEFAULT_TRANSACTION),
            ops_w.unwrap_or(Self::DEFAULT_OPS),
            data_w.unwrap_or(Self::DEFAULT_DATA),
        )
    }

    pub fn transaction(&self) -> f64 {
        self.transaction_w
    }

    pub fn ops(&self) -> f64 {
        self.ops_w
    }

    pub fn data(&self) -> f64 {
        self.data_w
    }

    pub fn client(&self) -> f64 {
        self.client_w
    }

    pub fn total(&self) -> f64 {
        self.transaction_w + self.ops_w + self.data_w + self.client_w
    }

    pub fn is_overallocated(&self) -> bool {
        self.transaction_w + self.ops_w + self.data_w > 1.0
    }
}

impl Default for PolicyWeights {
    fn default() -> Self {
        Self {
            transaction_w: Self::DEFAULT_TRANSACTION,
            ops_w: Self::DEFAULT_OPS,
            data_w: Self::DEFAULT_DATA,
            client_w: (1.0 - (Self::DEFAULT_TRANSACTION + Self::DEFAULT_OPS + Self::DEFAULT_DATA))
                .max(0.0),
        }
    }
}

fn check(signal: Signal, value: f64) -> Result<(), WeightError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(WeightError::OutOfRange { signal, value })
    }
}
