//! Fixed-width table rendering.
//!
//! Pure function of the aggregated rows, so identical inputs always produce
//! byte-identical output. Availability cells render as `"N (P.P%)"` with the
//! percentage to one decimal place; all-zero rows are still printed.

use crate::cli::RunSelection;
use crate::report::ReportRow;

const FIXED_HEADERS: [&str; 7] = [
    "Context",
    "Environment",
    "Total Checked",
    "LineageHash",
    "strax",
    "straxen",
    "cutax",
];

/// One-line description of what was checked, uppercased like the labels the
/// shifters are used to reading.
pub fn headline(data_type: &str, selection: &RunSelection) -> String {
    let data_type = data_type.to_uppercase();
    match selection {
        RunSelection::SingleRun(run) => {
            format!("Checking for {data_type} for run_id: {run}")
        }
        RunSelection::FileList(path) => {
            format!("Checking for {data_type} from file: {}", path.display())
        }
        RunSelection::Filter {
            science_runs,
            sources,
        } => format!(
            "Checking for {data_type} in {} with source: {}",
            join_upper(science_runs),
            join_upper(sources)
        ),
    }
}

/// Render the rows as a fixed-width table, one column per storage location
/// after the version columns. Column order follows the requested location
/// order, not the alphabetical row map.
pub fn render(rows: &[ReportRow], locations: &[String]) -> String {
    let mut headers: Vec<String> = FIXED_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.extend(locations.iter().cloned());

    let mut body: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = vec![
            row.context.clone(),
            row.environment.clone(),
            row.checked.to_string(),
            row.lineage_hash.clone(),
            row.strax.clone(),
            row.straxen.clone(),
            row.cutax.clone(),
        ];
        for location in locations {
            let count = row.locations.get(location).copied().unwrap_or_default();
            cells.push(format!("{} ({:.1}%)", count.present, count.percentage()));
        }
        body.push(cells);
    }

    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for cells in &body {
        for (index, cell) in cells.iter().enumerate() {
            widths[index] = widths[index].max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers, &widths);
    for cells in &body {
        push_row(&mut out, cells, &widths);
    }
    out
}

fn join_upper(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| label.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (index, cell) in cells.iter().enumerate() {
        if index > 0 {
            line.push_str("  ");
        }
        line.push_str(&format!("{cell:<width$}", width = widths[index]));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
