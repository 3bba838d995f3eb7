use crate::topology::GeoPosition;
use pretty_dtoa::{dtoa, FmtFloatConfig};

const FLOAT_CONFIG: FmtFloatConfig = FmtFloatConfig::default()
    .add_point_zero(false)
    .max_significant_digits(9);

// Shortest representation that reads back to the same value.
const CELL_CONFIG: FmtFloatConfig = FmtFloatConfig::default()
    .add_point_zero(false)
    .force_no_e_notation();

pub fn format_f64(f: f64) -> String {
    dtoa(f, FLOAT_CONFIG)
}

/// Formats a table cell without rounding. Whole numbers drop the `.0`.
pub fn format_cell(f: f64) -> String {
    dtoa(f, CELL_CONFIG)
}

fn format_position(p: &GeoPosition) -> String {
    format!("({}, {})", format_f64(p.lat), format_f64(p.lon))
}

pub fn format_position_vec(v: &[GeoPosition]) -> String {
    let a: Vec<String> = v.iter().map(format_position).collect();
    format!("[{}]", a.join(", "))
}

/// Joins cells into a LaTeX tabular row: `a & b & c \\`.
pub fn latex_row<S: AsRef<str>>(cells: &[S]) -> String {
    let a: Vec<&str> = cells.iter().map(|c| c.as_ref()).collect();
    format!("{} \\\\", a.join(" & "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_f64() {
        assert_eq!(format_f64(0.0), "0");
        assert_eq!(format_f64(475.0), "475");
        assert_eq!(format_f64(3.27), "3.27");
        assert_eq!(format_f64(123.4567891234), "123.456789");
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(0.0), "0");
        assert_eq!(format_cell(475.0), "475");
        assert_eq!(format_cell(123.4567891234), "123.4567891234");
        assert_eq!(format_cell(1234567.5), "1234567.5");
    }

    #[test]
    fn test_latex_row() {
        assert_eq!(latex_row(&["2", "475", "3.27"]), "2 & 475 & 3.27 \\\\");
    }

    #[test]
    fn test_format_position_vec() {
        let v = [GeoPosition::new(42.0, -114.0)];
        assert_eq!(format_position_vec(&v), "[(42, -114)]");
    }
}
