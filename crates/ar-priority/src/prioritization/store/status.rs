use crate::prioritization::domain::DEFAULT_STATUS;
use serde::Serialize;

/// Which `status` columns survive the ops ⟕ transactions join.
///
/// A relational merge keeps a column unqualified when only one side carries
/// it and suffixes both copies (`_x` for ops, `_y` for transactions) when the
/// names collide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLayout {
    #[default]
    Collided,
    TransactionsOnly,
    OpsOnly,
    Absent,
}

impl StatusLayout {
    pub const fn from_sources(ops_has_status: bool, transactions_has_status: bool) -> Self {
        match (ops_has_status, transactions_has_status) {
            (true, true) => Self::Collided,
            (false, true) => Self::TransactionsOnly,
            (true, false) => Self::OpsOnly,
            (false, false) => Self::Absent,
        }
    }
}

/// Status cells of one joined row, named the way the merged table names them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusColumns {
    /// Which of the columns below exist in the merged table.
    pub layout: StatusLayout,
    /// Ops-side status after a collision.
    pub status_x: Option<String>,
    /// Transaction-side status after a collision.
    pub status_y: Option<String>,
    /// The single status column when no collision happened.
    pub status: Option<String>,
}

impl StatusColumns {
    pub fn from_layout(
        layout: StatusLayout,
        ops_status: Option<String>,
        transaction_status: Option<String>,
    ) -> Self {
        match layout {
            StatusLayout::Collided => Self {
                layout,
                status_x: ops_status,
                status_y: transaction_status,
                status: None,
            },
            StatusLayout::TransactionsOnly => Self {
                layout,
                status: transaction_status,
                ..Self::default()
            },
            StatusLayout::OpsOnly => Self {
                layout,
                status: ops_status,
                ..Self::default()
            },
            StatusLayout::Absent => Self {
                layout,
                ..Self::default()
            },
        }
    }

    fn get(&self, column: StatusColumn) -> Option<&str> {
        let value = match column {
            StatusColumn::TransactionSide => self.status_y.as_deref(),
            StatusColumn::Unqualified => self.status.as_deref(),
            StatusColumn::OpsSide => self.status_x.as_deref(),
        };
        value.map(str::trim).filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColumn {
    TransactionSide,
    Unqualified,
    OpsSide,
}

impl StatusLayout {
    pub const fn columns(self) -> &'static [StatusColumn] {
        match self {
            Self::Collided => &[StatusColumn::OpsSide, StatusColumn::TransactionSide],
            Self::TransactionsOnly | Self::OpsOnly => &[StatusColumn::Unqualified],
            Self::Absent => &[],
        }
    }

    /// The first column of [`INVOICE_STATUS_PREFERENCE`] present in the
    /// merged table. The choice is per table, never per row.
    pub fn invoice_status_column(self) -> Option<StatusColumn> {
        INVOICE_STATUS_PREFERENCE
            .iter()
            .copied()
            .find(|column| self.columns().contains(column))
    }
}

/// Preference order for the column holding the invoice status. This depends
/// on both source schemas naming the column `status`; a rename on either side
/// silently changes which column wins.
pub const INVOICE_STATUS_PREFERENCE: [StatusColumn; 3] = [
    StatusColumn::TransactionSide,
    StatusColumn::Unqualified,
    StatusColumn::OpsSide,
];

/// The cell of the layout's invoice status column, else `"open"`. A blank
/// cell in the chosen column never falls through to another column.
pub fn resolve_invoice_status(columns: &StatusColumns) -> String {
    columns
        .layout
        .invoice_status_column()
        .and_then(|column| columns.get(column))
        .unwrap_or(DEFAULT_STATUS)
        .to_string()
}
