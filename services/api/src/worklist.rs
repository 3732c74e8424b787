use ar_priority::config::AppConfig;
use ar_priority::error::AppError;
use ar_priority::prioritization::report::format_currency;
use ar_priority::prioritization::report::views::WorklistSummary;
use ar_priority::prioritization::store::load_joined;
use ar_priority::prioritization::{PolicyWeights, Worklist};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct WorklistArgs {
    /// Directory holding the four source CSV files (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Cash / transaction weight in [0, 1] (default 0.4)
    #[arg(long)]
    pub(crate) transaction_weight: Option<f64>,
    /// Ops / SLA weight in [0, 1] (default 0.3)
    #[arg(long)]
    pub(crate) ops_weight: Option<f64>,
    /// Data quality weight in [0, 1] (default 0.2)
    #[arg(long)]
    pub(crate) data_weight: Option<f64>,
    /// Number of ranked items to show and export (defaults to APP_TOP_N)
    #[arg(long)]
    pub(crate) top: Option<usize>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Write the top-N slice to this CSV file
    #[arg(long)]
    pub(crate) csv_out: Option<PathBuf>,
}

pub(crate) fn run_worklist(args: WorklistArgs) -> Result<(), AppError> {
    let WorklistArgs {
        data_dir,
        transaction_weight,
        ops_weight,
        data_weight,
        top,
        today,
        csv_out,
    } = args;

    let config = AppConfig::load()?;
    let data_dir = data_dir.unwrap_or(config.worklist.data_dir);
    let top_n = top.filter(|n| *n > 0).unwrap_or(config.worklist.top_n);
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let weights = PolicyWeights::from_optional(transaction_weight, ops_weight, data_weight)?;

    let table = load_joined(&data_dir)?;
    let worklist = Worklist::compute(&table, weights, today);
    let summary = worklist.summary(top_n);

    render_worklist(&worklist, &summary, &data_dir);

    if let Some(path) = csv_out {
        let file = File::create(&path)?;
        worklist.write_csv(top_n, BufWriter::new(file))?;
        println!(
            "\nWrote {} ranked items to {}",
            summary.top_items.len(),
            path.display()
        );
    }

    Ok(())
}

fn render_worklist(worklist: &Worklist, summary: &WorklistSummary, data_dir: &std::path::Path) {
    let weights = worklist.weights();
    println!("AR priority worklist");
    println!(
        "Source: {} (evaluated {})",
        data_dir.display(),
        worklist.today()
    );
    println!(
        "Weights: transaction {:.2} | ops {:.2} | data {:.2} | client {:.2}",
        weights.transaction(),
        weights.ops(),
        weights.data(),
        weights.client()
    );
    if weights.is_overallocated() {
        println!(
            "  Supplied weights total {:.2}; client weight floored at 0",
            weights.total()
        );
    }

    let formatted = &summary.formatted;
    println!("\nPortfolio");
    println!("- Total AR: {}", formatted.total_amount);
    println!(
        "- Overdue AR: {} ({} of items)",
        formatted.overdue_amount, formatted.pct_overdue
    );
    println!("- Blocked by ops: {}", formatted.blocked_amount);
    println!("- Exception rate: {}", formatted.exception_rate);

    if summary.aging.is_empty() {
        println!("\nAging: no items");
    } else {
        println!("\nAging");
        for entry in &summary.aging {
            println!(
                "- {}: {} across {} invoices",
                entry.bucket_label,
                format_currency(entry.amount),
                entry.count
            );
        }
    }

    let concentration = &summary.concentration;
    println!(
        "\nTop {} of {} items ({:.1}% of AR)",
        concentration.count,
        summary.totals.item_count,
        concentration.pct_amount
    );
    for view in &summary.top_items {
        let row = &view.row;
        println!(
            "{:>3}. {} | {} | {} | {} | {}{} | score {:.1} | {}",
            view.rank,
            row.ops_item_id,
            row.client_id.as_deref().unwrap_or("-"),
            row.invoice_id.as_deref().unwrap_or("-"),
            format_currency(row.amount),
            row.invoice_status,
            if row.blocks_invoicing == 1 { " | blocked" } else { "" },
            row.priority_score,
            view.dominant_signal_label
        );
    }
}
