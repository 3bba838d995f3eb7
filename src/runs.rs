use std::fmt;
use std::path::{Path, PathBuf};

/// Variant of the interdiction problem solved by the heuristic.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum ProblemType {
    /// Any set of k branches may be interdicted.
    Plain,
    /// Interdicted branches must lie within a distance threshold D.
    Planar,
    /// Interdicted branches must be topologically close.
    Topological,
}

impl ProblemType {
    pub const ALL: [ProblemType; 3] = [
        ProblemType::Plain,
        ProblemType::Planar,
        ProblemType::Topological,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProblemType::Plain => "plain",
            ProblemType::Planar => "planar",
            ProblemType::Topological => "topological",
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Study describes the grid of solver runs made on one test system.
#[derive(Debug, Clone, PartialEq)]
pub struct Study {
    /// Number of buses in the test system, used as the log file prefix.
    pub buses: usize,

    /// Interdiction budgets.
    pub k: Vec<usize>,

    /// Distance thresholds (km) swept for the planar problem.
    pub d: Vec<u32>,

    /// Distance threshold of the planar runs in the summary table.
    pub planar_d: u32,
}

impl Study {
    /// IEEE RTS-96 (24 bus) runs.
    pub fn rts96() -> Self {
        Self {
            buses: 24,
            k: (2..=6).collect(),
            d: (10..=30).step_by(2).collect(),
            planar_d: 5,
        }
    }

    /// WECC (240 bus) runs.
    pub fn wecc() -> Self {
        Self {
            buses: 240,
            k: (2..=6).collect(),
            d: (100..=1000).step_by(100).collect(),
            planar_d: 500,
        }
    }

    /// Log file name of a run, `{buses}-{k}-{problem}[-{d}]-heuristic.txt`.
    pub fn log_name(&self, k: usize, problem: ProblemType, d: Option<u32>) -> String {
        match d {
            Some(d) => format!("{}-{}-{}-{}-heuristic.txt", self.buses, k, problem, d),
            None => format!("{}-{}-{}-heuristic.txt", self.buses, k, problem),
        }
    }

    /// Log of a summary table run. Planar runs use `planar_d`.
    pub fn summary_log(&self, dir: &Path, k: usize, problem: ProblemType) -> PathBuf {
        let d = match problem {
            ProblemType::Planar => Some(self.planar_d),
            _ => None,
        };
        dir.join(self.log_name(k, problem, d))
    }

    /// Log of a planar run at distance threshold `d`.
    pub fn sweep_log(&self, dir: &Path, k: usize, d: u32) -> PathBuf {
        dir.join(self.log_name(k, ProblemType::Planar, Some(d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_type_display() {
        assert_eq!(ProblemType::Plain.to_string(), "plain");
        assert_eq!(ProblemType::Topological.to_string(), "topological");
    }

    #[test]
    fn test_log_paths() {
        let study = Study::rts96();
        let dir = Path::new("../output");

        assert_eq!(
            study.summary_log(dir, 3, ProblemType::Plain),
            dir.join("24-3-plain-heuristic.txt")
        );
        assert_eq!(
            study.summary_log(dir, 3, ProblemType::Planar),
            dir.join("24-3-planar-5-heuristic.txt")
        );
        assert_eq!(
            Study::wecc().sweep_log(dir, 6, 700),
            dir.join("240-6-planar-700-heuristic.txt")
        );
    }

    #[test]
    fn test_sweeps() {
        let study = Study::rts96();
        assert_eq!(study.k, vec![2, 3, 4, 5, 6]);
        assert_eq!(study.d.len(), 11);
        assert_eq!(study.d.last(), Some(&30));

        let study = Study::wecc();
        assert_eq!(study.d.len(), 10);
        assert_eq!(study.d[0], 100);
    }
}
