use super::ui;
use crate::core::format::{format_compact, format_currency};
use crate::core::resolver::{RateResolver, ResolutionResult};
use crate::core::series::{
    self, AlignedSeries, DateRange, ScaledValuePoint, align_allocation_series,
    align_holding_series, scale_value_series,
};
use crate::core::snapshot::SnapshotRepository;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::Cell;
use futures::future::join;
use tracing::debug;

/// Everything needed to chart one user's snapshots over a date window.
#[derive(Debug)]
pub struct SeriesView {
    pub range: DateRange,
    pub allocations: AlignedSeries,
    /// Absolute balances per asset, in the `from` currency.
    pub holdings: AlignedSeries,
    pub values: Vec<ScaledValuePoint>,
    pub rate: ResolutionResult,
    pub change: Option<f64>,
    pub from: String,
    pub to: String,
}

pub async fn build(
    repository: &dyn SnapshotRepository,
    resolver: &RateResolver,
    user: &str,
    range: DateRange,
    today: NaiveDate,
) -> Result<SeriesView> {
    let (records, rate) = join(repository.list(user), resolver.resolve()).await;
    let records = records.with_context(|| format!("Failed to load snapshots for {user}"))?;

    let records = range.filter(&records, today);
    debug!(%range, count = records.len(), "Snapshots in range");

    let values = scale_value_series(&records, rate.value);
    let settings = resolver.settings();
    Ok(SeriesView {
        range,
        allocations: align_allocation_series(&records),
        holdings: align_holding_series(&records),
        change: series::percent_change(&values),
        values,
        rate,
        from: settings.from.clone(),
        to: settings.to.clone(),
    })
}

impl SeriesView {
    pub fn display_allocation_table(&self) -> String {
        aligned_table(&self.allocations, ui::share_cell)
    }

    pub fn display_holding_table(&self) -> String {
        aligned_table(&self.holdings, |balance| {
            ui::number_cell(format_currency(balance, &self.from))
        })
    }

    pub fn display_value_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell(&format!("Value ({})", self.to)),
            ui::header_cell("Compact"),
        ]);

        for point in &self.values {
            table.add_row(vec![
                Cell::new(point.date.to_string()),
                ui::number_cell(format_currency(point.converted_value, &self.to)),
                ui::number_cell(format_compact(point.converted_value, "")),
            ]);
        }

        table.to_string()
    }

    pub fn display(&self) -> String {
        let title = format!("Snapshots ({})", self.range);
        let mut output = format!("{}\n\n", ui::style_text(&title, ui::StyleType::Title));

        if self.values.is_empty() {
            output.push_str(&ui::style_text(
                "No snapshots in this range",
                ui::StyleType::Subtle,
            ));
            return output;
        }

        output.push_str("Allocation (%)\n");
        output.push_str(&self.display_allocation_table());
        output.push_str(&format!("\n\nHoldings ({})\n", self.from));
        output.push_str(&self.display_holding_table());
        output.push_str("\n\n");
        output.push_str(&self.display_value_table());

        let rate_note = format!(
            "Converted at {:.4} {}/{} ({})",
            self.rate.value, self.to, self.from, self.rate.origin
        );
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(&rate_note, ui::StyleType::Subtle)
        ));

        if let Some(change) = self.change {
            output.push_str(&format!(
                "\n{} {}",
                ui::style_text("Change over range:", ui::StyleType::TotalLabel),
                ui::change_text(change)
            ));
        }
        output
    }
}

fn aligned_table(series: &AlignedSeries, cell: impl Fn(f64) -> Cell) -> String {
    let mut table = ui::new_styled_table();

    let mut header = vec![ui::header_cell("Date")];
    header.extend(series.keys.iter().map(|key| ui::header_cell(key.as_str())));
    table.set_header(header);

    for point in &series.points {
        let mut row = vec![Cell::new(point.date.to_string())];
        row.extend(point.values.values().map(|value| cell(*value)));
        table.add_row(row);
    }

    table.to_string()
}

pub async fn run(
    repository: &dyn SnapshotRepository,
    resolver: &RateResolver,
    user: &str,
    range: DateRange,
) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let view = build(repository, resolver, user, range, today).await?;
    println!("{}", view.display());
    Ok(())
}
