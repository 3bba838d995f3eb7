use crate::error::{Error, Result};
use crate::topology::Branch;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const WHAT: &str = "log";

/// Headers that open or close a block of the solver report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Opens the interdicted branch block.
    Interdicted,
    /// Closes the branch block and opens the load shed block.
    Bus,
    /// Closes the load shed block.
    Time,
}

/// Scalar summary values reported by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    OptGap,
    LoadShed,
    Time,
    Iterations,
}

impl Metric {
    fn name(&self) -> &'static str {
        match self {
            Metric::OptGap => "optimality gap",
            Metric::LoadShed => "load shed",
            Metric::Time => "time",
            Metric::Iterations => "iterations",
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Line<'a> {
    Blank,
    Header(Section),
    Data(Vec<&'a str>),
}

/// Classifies a report line by its leading keyword.
pub fn classify(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        Line::Blank
    } else if line.starts_with("interdicted") {
        Line::Header(Section::Interdicted)
    } else if line.starts_with("bus") {
        Line::Header(Section::Bus)
    } else if line.starts_with("time") {
        Line::Header(Section::Time)
    } else {
        Line::Data(line.split_whitespace().collect())
    }
}

/// Returns every summary metric a line reports. `opt` and `load` match as
/// prefixes, `time` and `iterations` anywhere in the line.
pub fn match_metrics(line: &str) -> Vec<Metric> {
    let line = line.trim();
    let mut metrics = Vec::new();
    if line.starts_with("opt") {
        metrics.push(Metric::OptGap);
    }
    if line.starts_with("load") {
        metrics.push(Metric::LoadShed);
    }
    if line.contains("time") {
        metrics.push(Metric::Time);
    }
    if line.contains("iterations") {
        metrics.push(Metric::Iterations);
    }
    metrics
}

/// Interdicted branches and the resulting load shed of one solver run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterdictionRecord {
    pub branch: Vec<Branch>,

    /// Load shed at each bus (MW).
    pub shed: BTreeMap<usize, f64>,
}

impl InterdictionRecord {
    pub fn total_shed(&self) -> f64 {
        self.shed.values().sum()
    }

    /// Returns each shedding bus with its share of the total shed in percent,
    /// or `None` when no load is shed.
    pub fn shed_radii(&self) -> Option<Vec<(usize, f64)>> {
        let total = self.total_shed();
        if total <= 0.0 {
            return None;
        }
        Some(
            self.shed
                .iter()
                .filter(|&(_, &pd)| pd > 0.0)
                .map(|(&bus, &pd)| (bus, pd / total * 100.0))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryMetrics {
    pub opt_gap: Option<f64>,

    /// Elapsed time (s).
    pub time: Option<f64>,

    pub iterations: Option<usize>,

    /// Total load shed (MW).
    pub load_shed: Option<f64>,
}

/// HeuristicLog is the parsed content of a heuristic solver report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeuristicLog {
    pub record: InterdictionRecord,
    pub summary: SummaryMetrics,
}

impl HeuristicLog {
    /// Difference between the reported total shed and the sum of the bus
    /// values, if both are present and they disagree.
    pub fn shed_mismatch(&self) -> Option<f64> {
        let reported = self.summary.load_shed?;
        if self.record.shed.is_empty() {
            return None;
        }
        let diff = reported - self.record.total_shed();
        if diff.abs() > 1e-6 * reported.abs().max(1.0) {
            Some(diff)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Start,
    Interdicted { opened: usize },
    Bus { opened: usize },
    Done,
}

struct LogBuilder {
    state: State,
    record: InterdictionRecord,
    summary: SummaryMetrics,
}

impl LogBuilder {
    fn new() -> Self {
        Self {
            state: State::Start,
            record: InterdictionRecord::default(),
            summary: SummaryMetrics::default(),
        }
    }

    fn header(&mut self, section: Section, line: usize) -> Result<()> {
        self.state = match (section, self.state) {
            (Section::Interdicted, State::Start) => State::Interdicted { opened: line },
            (Section::Bus, State::Start | State::Interdicted { .. }) => State::Bus { opened: line },
            (Section::Time, State::Interdicted { .. } | State::Bus { .. }) => State::Done,
            // Outside a block `time` is only a summary line.
            (Section::Time, state) => state,
            (section, _) => {
                return Err(Error::parse(
                    WHAT,
                    line,
                    format!("unexpected {:?} header", section),
                ))
            }
        };
        log::trace!("line {}: {:?}", line, self.state);
        Ok(())
    }

    fn data(&mut self, fields: &[&str], line: usize) -> Result<()> {
        match self.state {
            State::Interdicted { .. } => {
                let [f_bus, t_bus] = pair(fields, line, "branch")?;
                self.record
                    .branch
                    .push(Branch::new(number(f_bus, line)?, number(t_bus, line)?));
            }
            State::Bus { .. } => {
                let [bus, pd] = pair(fields, line, "load shed")?;
                let bus: usize = number(bus, line)?;
                let pd: f64 = number(pd, line)?;
                if !pd.is_finite() || pd < 0.0 {
                    return Err(Error::parse(
                        WHAT,
                        line,
                        format!("load shed at bus {} must be non-negative: {}", bus, pd),
                    ));
                }
                if self.record.shed.insert(bus, pd).is_some() {
                    return Err(Error::parse(
                        WHAT,
                        line,
                        format!("duplicate load shed for bus {}", bus),
                    ));
                }
            }
            State::Start | State::Done => {
                log::trace!("line {}: ignored {:?}", line, fields);
            }
        }
        Ok(())
    }

    fn metrics(&mut self, metrics: &[Metric], text: &str, line: usize) -> Result<()> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let value = match tokens.as_slice() {
            [_, .., value] => *value,
            _ => {
                return Err(Error::parse(
                    WHAT,
                    line,
                    format!("missing value for {}", metrics[0].name()),
                ))
            }
        };
        for metric in metrics {
            match metric {
                Metric::OptGap => self.summary.opt_gap = Some(number(value, line)?),
                Metric::LoadShed => self.summary.load_shed = Some(number(value, line)?),
                Metric::Time => self.summary.time = Some(number(value, line)?),
                Metric::Iterations => self.summary.iterations = Some(number(value, line)?),
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<HeuristicLog> {
        match self.state {
            State::Interdicted { opened } => Err(Error::parse(
                WHAT,
                opened,
                "interdicted block is never closed",
            )),
            State::Bus { opened } => Err(Error::parse(WHAT, opened, "bus block is never closed")),
            State::Start | State::Done => Ok(HeuristicLog {
                record: self.record,
                summary: self.summary,
            }),
        }
    }
}

fn pair<'a>(fields: &[&'a str], line: usize, what: &str) -> Result<[&'a str; 2]> {
    match fields {
        [a, b] => Ok([*a, *b]),
        _ => Err(Error::parse(
            WHAT,
            line,
            format!("expected 2 fields in {} row, found {}", what, fields.len()),
        )),
    }
}

fn number<T: std::str::FromStr>(s: &str, line: usize) -> Result<T> {
    s.parse()
        .map_err(|_| Error::parse(WHAT, line, format!("invalid number {:?}", s)))
}

/// Parses the text of a heuristic solver report.
///
/// Blocks must appear in the order interdicted, bus, time. A missing block
/// is treated as empty. Summary lines may appear anywhere and the last
/// occurrence of each metric wins.
pub fn parse_log(text: &str) -> Result<HeuristicLog> {
    let mut builder = LogBuilder::new();

    for (i, text) in text.lines().enumerate() {
        let line = i + 1;
        let metrics = match_metrics(text);

        match classify(text) {
            Line::Blank => {}
            Line::Header(section) => {
                builder.header(section, line)?;
                // A bare header carries no value.
                if !metrics.is_empty() && text.split_whitespace().nth(1).is_some() {
                    builder.metrics(&metrics, text, line)?;
                }
            }
            Line::Data(fields) => {
                if metrics.is_empty() {
                    builder.data(&fields, line)?;
                } else {
                    builder.metrics(&metrics, text, line)?;
                }
            }
        }
    }

    let log = builder.finish()?;
    if let Some(diff) = log.shed_mismatch() {
        log::warn!(
            "bus load shed sums to {} but the reported total differs by {}",
            log.record.total_shed(),
            diff
        );
    }
    Ok(log)
}

/// Reads and parses a heuristic solver report.
pub fn read_log(path: &Path) -> Result<HeuristicLog> {
    let text = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    let log = parse_log(&text)?;
    log::debug!(
        "{}: {} interdicted branches, {} shedding buses",
        path.display(),
        log.record.branch.len(),
        log.record.shed.len()
    );
    Ok(log)
}
