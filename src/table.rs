use crate::error::Result;
use crate::format::{format_cell, latex_row};
use crate::heuristic::{read_log, SummaryMetrics};
use crate::runs::{ProblemType, Study};
use std::path::Path;

// Missing metrics print as zero.
fn cells(s: &SummaryMetrics) -> [String; 3] {
    [
        format_cell(s.load_shed.unwrap_or(0.0)),
        format_cell(s.time.unwrap_or(0.0)),
        s.iterations.unwrap_or(0).to_string(),
    ]
}

/// `k & load shed & time & iterations & opt gap \\`
pub fn summary_row(k: usize, s: &SummaryMetrics) -> String {
    let [load_shed, time, iterations] = cells(s);
    let opt_gap = format_cell(s.opt_gap.unwrap_or(0.0));
    latex_row(&[k.to_string(), load_shed, time, iterations, opt_gap])
}

/// `k & load shed & time & iterations \\`
pub fn sweep_row(k: usize, s: &SummaryMetrics) -> String {
    let [load_shed, time, iterations] = cells(s);
    latex_row(&[k.to_string(), load_shed, time, iterations])
}

/// Summary rows for each problem type, one row per interdiction budget.
pub fn summary_table(study: &Study, dir: &Path) -> Result<Vec<(ProblemType, Vec<String>)>> {
    ProblemType::ALL
        .into_iter()
        .map(|problem| {
            let rows = study
                .k
                .iter()
                .map(|&k| {
                    let log = read_log(&study.summary_log(dir, k, problem))?;
                    Ok(summary_row(k, &log.summary))
                })
                .collect::<Result<Vec<String>>>()?;
            Ok((problem, rows))
        })
        .collect()
}

/// Planar rows for every (k, D) pair, D varying fastest.
pub fn sweep_table(study: &Study, dir: &Path) -> Result<Vec<String>> {
    let mut rows = Vec::with_capacity(study.k.len() * study.d.len());
    for &k in &study.k {
        for &d in &study.d {
            let log = read_log(&study.sweep_log(dir, k, d))?;
            rows.push(sweep_row(k, &log.summary));
        }
    }
    Ok(rows)
}
