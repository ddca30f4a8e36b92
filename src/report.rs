//! CSV report writers
//!
//! Exports the enriched portfolio, the invalid-coordinate subset, and the
//! aggregate summaries. The enriched export carries every source column
//! verbatim followed by the derived columns; undefined derived values are
//! written as empty cells, never as zero.

use std::io::Write;

use crate::aggregate::{GroupMetrics, PivotTable};
use crate::engine::RunResult;
use crate::rating::{OccupancyCategory, RiskCategory};

/// Derived columns appended to the source header in the enriched export
pub const ENRICHED_EXTRA_COLUMNS: [&str; 4] =
    ["ZoneCode", "RiskCategory", "Rate", "EstimatedLoss"];

/// Write the enriched portfolio: source columns verbatim plus derived fields.
pub fn write_enriched<W: Write>(out: W, result: &RunResult) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = result.header.clone();
    header.extend(ENRICHED_EXTRA_COLUMNS.iter().map(|c| c.to_string()));
    writer.write_record(&header)?;

    for row in &result.enriched {
        let mut cells = row.record.raw.clone();
        cells.push(row.zone_code.map(|c| c.to_string()).unwrap_or_default());
        cells.push(row.risk.as_str().to_string());
        cells.push(fmt_opt(row.rate));
        cells.push(fmt_opt(row.estimated_loss));
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the rows excluded for invalid coordinates, cells verbatim.
pub fn write_invalid<W: Write>(
    out: W,
    header: &[String],
    rows: &[Vec<String>],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the per-underwriting-year summary.
pub fn write_year_summary<W: Write>(
    out: W,
    summary: &[(i32, GroupMetrics)],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["UY", "PolicyCount", "TotalTSI", "TotalPML"])?;
    for (year, metrics) in summary {
        writer.write_record(&metric_row(year.to_string(), metrics))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the per-occupancy summary.
pub fn write_occupancy_summary<W: Write>(
    out: W,
    summary: &[(OccupancyCategory, GroupMetrics)],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Occupancy", "PolicyCount", "TotalTSI", "TotalPML"])?;
    for (occupancy, metrics) in summary {
        writer.write_record(&metric_row(occupancy.as_str().to_string(), metrics))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the per-risk-category summary.
pub fn write_risk_summary<W: Write>(
    out: W,
    summary: &[(RiskCategory, GroupMetrics)],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["RiskCategory", "PolicyCount", "TotalTSI", "TotalPML"])?;
    for (risk, metrics) in summary {
        writer.write_record(&metric_row(risk.as_str().to_string(), metrics))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the record count per risk category, all four categories.
pub fn write_risk_distribution<W: Write>(
    out: W,
    distribution: &[(RiskCategory, u64)],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["RiskCategory", "PolicyCount"])?;
    for (risk, count) in distribution {
        writer.write_record([risk.as_str(), &count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the year-by-risk pivot.
pub fn write_year_risk_pivot<W: Write>(
    out: W,
    pivot: &PivotTable<RiskCategory>,
) -> Result<(), csv::Error> {
    write_pivot(out, pivot, |risk| risk.as_str().to_string())
}

/// Write the year-by-(occupancy, risk) pivot.
pub fn write_year_occupancy_risk_pivot<W: Write>(
    out: W,
    pivot: &PivotTable<(OccupancyCategory, RiskCategory)>,
) -> Result<(), csv::Error> {
    write_pivot(out, pivot, |(occupancy, risk)| {
        format!("{} {}", occupancy.as_str(), risk.as_str())
    })
}

/// One pivot row per year; three metric columns per pivot column.
fn write_pivot<W: Write, C>(
    out: W,
    pivot: &PivotTable<C>,
    label: impl Fn(&C) -> String,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["UY".to_string()];
    for column in &pivot.columns {
        let label = label(column);
        header.push(format!("{label} PolicyCount"));
        header.push(format!("{label} TotalTSI"));
        header.push(format!("{label} TotalPML"));
    }
    writer.write_record(&header)?;

    for (year, cells) in &pivot.rows {
        let mut record = vec![year.to_string()];
        for metrics in cells {
            record.push(metrics.policy_count.to_string());
            record.push(fmt_number(metrics.total_tsi));
            record.push(fmt_number(metrics.total_loss));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn metric_row(key: String, metrics: &GroupMetrics) -> Vec<String> {
    vec![
        key,
        metrics.policy_count.to_string(),
        fmt_number(metrics.total_tsi),
        fmt_number(metrics.total_loss),
    ]
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(fmt_number).unwrap_or_default()
}

/// Whole monetary amounts print without a trailing ".0".
fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
