//! Loads the four source relations and joins them into one item table.

mod cache;
mod join;
mod parser;
mod status;

pub use cache::CachedRecordStore;
pub use join::{join, JoinedRow, JoinedTable};
pub use parser::{ClientTierRow, OpsItemRow, RiskRow, TransactionRow};
pub use status::{
    resolve_invoice_status, StatusColumn, StatusColumns, StatusLayout, INVOICE_STATUS_PREFERENCE,
};

use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// One of the four tabular inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    OpsItems,
    Transactions,
    RiskFlags,
    ClientTiers,
}

impl Relation {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::OpsItems,
            Self::Transactions,
            Self::RiskFlags,
            Self::ClientTiers,
        ]
    }

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::OpsItems => "ops_items.csv",
            Self::Transactions => "transactions.csv",
            Self::RiskFlags => "risk_data_quality.csv",
            Self::ClientTiers => "client_tier.csv",
        }
    }

    /// Columns whose absence makes the relation unusable. `status` is
    /// optional on both sides that may carry it.
    pub const fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::OpsItems => &["ops_item_id", "type", "sla_due", "owner", "age_days"],
            Self::Transactions => &[
                "transaction_id",
                "ops_item_id",
                "client_id",
                "invoice_id",
                "amount",
                "due_date",
            ],
            Self::RiskFlags => &[
                "ops_item_id",
                "missing_fields",
                "dup_flag",
                "error_rate_by_client",
                "blocks_invoicing",
            ],
            Self::ClientTiers => &["client_id", "client_name", "tier"],
        }
    }

    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OpsItems => "ops items",
            Self::Transactions => "transactions",
            Self::RiskFlags => "risk/data-quality flags",
            Self::ClientTiers => "client tiers",
        };
        f.write_str(label)
    }
}

/// Load-time failures. Anything past loading resolves nulls instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {relation} from {}: {source}", path.display())]
    Io {
        relation: Relation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {relation} data: {source}")]
    Csv {
        relation: Relation,
        #[source]
        source: csv::Error,
    },
    #[error("{relation} relation is missing required column '{column}'")]
    MissingColumn {
        relation: Relation,
        column: &'static str,
    },
}

/// The four relations as loaded, before joining.
#[derive(Debug, Clone, Default)]
pub struct SourceRelations {
    pub ops_items: Vec<OpsItemRow>,
    pub transactions: Vec<TransactionRow>,
    pub risk_flags: Vec<RiskRow>,
    pub client_tiers: Vec<ClientTierRow>,
    pub status_layout: StatusLayout,
}

impl SourceRelations {
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let open = |relation: Relation| {
            let path = relation.path_in(dir);
            File::open(&path).map_err(|source| LoadError::Io {
                relation,
                path,
                source,
            })
        };

        let relations = Self::from_readers(
            open(Relation::OpsItems)?,
            open(Relation::Transactions)?,
            open(Relation::RiskFlags)?,
            open(Relation::ClientTiers)?,
        )?;

        info!(
            dir = %dir.display(),
            ops_items = relations.ops_items.len(),
            transactions = relations.transactions.len(),
            risk_flags = relations.risk_flags.len(),
            client_tiers = relations.client_tiers.len(),
            "loaded source relations"
        );
        Ok(relations)
    }

    pub fn from_readers<O, T, R, C>(
        ops_items: O,
        transactions: T,
        risk_flags: R,
        client_tiers: C,
    ) -> Result<Self, LoadError>
    where
        O: Read,
        T: Read,
        R: Read,
        C: Read,
    {
        let ops = parser::parse_relation::<OpsItemRow, _>(Relation::OpsItems, ops_items)?;
        let transactions =
            parser::parse_relation::<TransactionRow, _>(Relation::Transactions, transactions)?;
        let risk = parser::parse_relation::<RiskRow, _>(Relation::RiskFlags, risk_flags)?;
        let clients = parser::parse_relation::<ClientTierRow, _>(Relation::ClientTiers, client_tiers)?;

        Ok(Self {
            status_layout: StatusLayout::from_sources(ops.has_status, transactions.has_status),
            ops_items: ops.rows,
            transactions: transactions.rows,
            risk_flags: risk.rows,
            client_tiers: clients.rows,
        })
    }

    pub fn join(&self) -> JoinedTable {
        join(self)
    }
}

/// Loads and joins the relations found in `dir` in one step.
pub fn load_joined<P: AsRef<Path>>(dir: P) -> Result<JoinedTable, LoadError> {
    SourceRelations::from_dir(dir).map(|relations| relations.join())
}
