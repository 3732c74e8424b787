mod export;
mod format;
mod rank;
mod summary;
pub mod views;

pub use export::write_worklist_csv;
pub use format::{format_currency, format_percent};
pub use rank::rank;
pub use summary::{
    aging_summary, build_summary, portfolio_totals, ranked_views, top_concentration,
};
