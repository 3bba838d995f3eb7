use crate::error::{Error, Result};
use crate::opt::LoadOpt;
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Geographic coordinate of a bus, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPosition {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Leaflet `[lat, lon]` pair.
    pub fn lat_lon(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

/// Branch is a transmission line between two buses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Branch {
    /// From bus number.
    pub from_bus: usize,

    /// To bus number.
    pub to_bus: usize,
}

impl Branch {
    pub fn new(from_bus: usize, to_bus: usize) -> Self {
        Self { from_bus, to_bus }
    }
}

/// Topology is the geographic layout of a transmission network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    /// Bus number to coordinate, in bus number order.
    pub position: BTreeMap<usize, GeoPosition>,

    /// Transmission lines in table row order.
    pub branch: Vec<Branch>,
}

impl Topology {
    /// Checks that every branch endpoint has coordinates.
    pub fn new(position: BTreeMap<usize, GeoPosition>, branch: Vec<Branch>) -> Result<Self> {
        let topology = Self { position, branch };
        for (i, br) in topology.branch.iter().enumerate() {
            topology.branch_path(br, &format!("branch {}", i + 1))?;
        }
        Ok(topology)
    }

    pub fn position(&self, bus: usize, context: &str) -> Result<GeoPosition> {
        self.position.get(&bus).copied().ok_or_else(|| Error::Lookup {
            bus,
            context: context.to_string(),
        })
    }

    /// Endpoint coordinates of a branch, from bus first.
    pub fn branch_path(&self, br: &Branch, context: &str) -> Result<[GeoPosition; 2]> {
        Ok([
            self.position(br.from_bus, context)?,
            self.position(br.to_bus, context)?,
        ])
    }
}

/// Loads the bus coordinate table and the branch table.
pub fn load_topology(geo_path: &Path, branch_path: &Path, opt: &LoadOpt) -> Result<Topology> {
    let file = File::open(geo_path).map_err(|err| Error::io(geo_path, err))?;
    let position = read_positions(file, opt.geo_headers)?;

    let file = File::open(branch_path).map_err(|err| Error::io(branch_path, err))?;
    let branch = read_branches(file, opt.branch_headers)?;

    log::debug!(
        "loaded {} buses from {} and {} branches from {}",
        position.len(),
        geo_path.display(),
        branch.len(),
        branch_path.display()
    );
    Topology::new(position, branch)
}

/// Reads `bus, lat, lon` rows. Columns after the third are ignored.
pub fn read_positions<R: Read>(rdr: R, has_headers: bool) -> Result<BTreeMap<usize, GeoPosition>> {
    const WHAT: &str = "bus table";

    let mut position = BTreeMap::new();
    for (line, record) in records(rdr, has_headers, WHAT)? {
        let bus: usize = field(&record, 0, line, WHAT)?;
        let lat: f64 = field(&record, 1, line, WHAT)?;
        let lon: f64 = field(&record, 2, line, WHAT)?;

        if position.insert(bus, GeoPosition::new(lat, lon)).is_some() {
            return Err(Error::parse(WHAT, line, format!("duplicate bus {}", bus)));
        }
    }
    Ok(position)
}

/// Reads `from_bus, to_bus` rows. Columns after the second are ignored.
pub fn read_branches<R: Read>(rdr: R, has_headers: bool) -> Result<Vec<Branch>> {
    const WHAT: &str = "branch table";

    records(rdr, has_headers, WHAT)?
        .into_iter()
        .map(|(line, record)| {
            Ok(Branch::new(
                field(&record, 0, line, WHAT)?,
                field(&record, 1, line, WHAT)?,
            ))
        })
        .collect()
}

fn records<R: Read>(
    rdr: R,
    has_headers: bool,
    what: &'static str,
) -> Result<Vec<(usize, StringRecord)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| {
            let line = err.position().map(|p| p.line() as usize).unwrap_or(0);
            Error::parse(what, line, err.to_string())
        })?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        rows.push((line, record));
    }
    Ok(rows)
}

fn field<T: FromStr>(
    record: &StringRecord,
    i: usize,
    line: usize,
    what: &'static str,
) -> Result<T> {
    let value = record
        .get(i)
        .ok_or_else(|| Error::parse(what, line, format!("missing column {}", i + 1)))?;
    value.parse().map_err(|_| {
        Error::parse(
            what,
            line,
            format!("invalid value {:?} in column {}", value, i + 1),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::testdata;
    use anyhow::{format_err, Result};

    const GEO: &str = "bus,lat,lon\n1,42.0,-114.0\n2,43.0,-113.0\n";

    #[test]
    fn test_read_scenario() -> Result<()> {
        let position = read_positions(GEO.as_bytes(), true)?;
        let branch = read_branches("from,to\n1,2\n".as_bytes(), true)?;
        let topology = Topology::new(position, branch)?;

        assert_eq!(topology.position.len(), 2);
        assert_eq!(topology.position[&1], GeoPosition::new(42.0, -114.0));
        assert_eq!(topology.position[&2], GeoPosition::new(43.0, -113.0));
        assert_eq!(topology.branch, vec![Branch::new(1, 2)]);
        Ok(())
    }

    #[test]
    fn test_one_entry_per_row() -> Result<()> {
        let file = File::open(testdata("rts_geo.csv"))?;
        let position = read_positions(file, true)?;

        assert_eq!(position.len(), 6);
        assert_eq!(
            position.keys().copied().collect::<Vec<_>>(),
            vec![101, 102, 103, 104, 105, 106]
        );
        Ok(())
    }

    #[test]
    fn test_branch_table_without_header() -> Result<()> {
        let branch = read_branches("3,4\n4,5,0.01\n".as_bytes(), false)?;
        assert_eq!(branch, vec![Branch::new(3, 4), Branch::new(4, 5)]);
        Ok(())
    }

    #[test]
    fn test_missing_bus() -> Result<()> {
        let position = read_positions(GEO.as_bytes(), true)?;
        let branch = vec![Branch::new(1, 7)];

        match Topology::new(position, branch) {
            Err(Error::Lookup { bus, .. }) => {
                assert_eq!(bus, 7);
                Ok(())
            }
            other => Err(format_err!("expected lookup error, got {:?}", other)),
        }
    }

    #[test]
    fn test_duplicate_bus() {
        let err = read_positions("bus,lat,lon\n1,42,-114\n1,43,-113\n".as_bytes(), true);
        assert!(matches!(err, Err(Error::Parse { line: 3, .. })));
    }

    #[test]
    fn test_malformed_row() {
        let err = read_positions("bus,lat,lon\n1,42,-114\n2,north,-113\n".as_bytes(), true);
        assert!(matches!(err, Err(Error::Parse { line: 3, .. })));
    }

    #[test]
    fn test_load_topology() -> Result<()> {
        let opt = LoadOpt::default();
        let topology = load_topology(
            &testdata("rts_geo.csv"),
            &testdata("rts_branches.csv"),
            &opt,
        )?;
        assert_eq!(topology.position.len(), 6);
        assert_eq!(topology.branch.len(), 7);
        assert_eq!(topology.branch[0], Branch::new(101, 102));
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_topology(
            &testdata("no_such_geo.csv"),
            &testdata("rts_branches.csv"),
            &LoadOpt::default(),
        );
        assert!(matches!(err, Err(Error::Io { .. })));
    }
}
