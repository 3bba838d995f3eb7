//! Grouped 3D bar charts of solver statistics.
//!
//! Bars are laid out on a grid: one row per group value (the interdiction
//! budget k) and one column per swept value (the distance threshold D). The
//! chart is drawn to SVG and converted to PDF.

use crate::error::{Error, Result};
use crate::heuristic::read_log;
use crate::opt::ChartOpt;
use crate::runs::Study;
use plotters::prelude::*;
use std::fs;
use std::path::Path;

const COLORS: [RGBColor; 5] = [RED, GREEN, BLUE, YELLOW, CYAN];

// Bar footprint along each horizontal axis.
const BAR_WIDTH: f64 = 0.8;

/// BarSeries is one row of bars sharing a group value.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub group: usize,

    /// (swept value, bar height) pairs.
    pub bars: Vec<(f64, f64)>,
}

/// Builds one series per interdiction budget with the iteration count of
/// each planar run. Runs that report no iteration count are left out.
pub fn iteration_series(study: &Study, dir: &Path) -> Result<Vec<BarSeries>> {
    let mut series = Vec::with_capacity(study.k.len());
    for &k in &study.k {
        let mut bars = Vec::with_capacity(study.d.len());
        for &d in &study.d {
            let path = study.sweep_log(dir, k, d);
            match read_log(&path)?.summary.iterations {
                Some(it) => bars.push((d as f64, it as f64)),
                None => log::warn!("{}: no iteration count", path.display()),
            }
        }
        series.push(BarSeries { group: k, bars });
    }
    Ok(series)
}

/// Sorted distinct swept values of all series.
fn sweep_values(series: &[BarSeries]) -> Vec<f64> {
    let mut values: Vec<f64> = series
        .iter()
        .flat_map(|s| s.bars.iter().map(|(x, _)| *x))
        .collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    values
}

fn tick_label(values: &[f64], pos: f64, prefix: &str, unit: &str) -> String {
    let i = pos.round();
    if i < 1.0 || (pos - i).abs() > 1e-6 {
        return String::new();
    }
    match values.get(i as usize - 1) {
        Some(v) if unit.is_empty() => format!("{}={}", prefix, v),
        Some(v) => format!("{}={} {}", prefix, v, unit),
        None => String::new(),
    }
}

/// 1-based positions of `ticks` evenly spaced labels among `n` values,
/// counted back from the last value so the last one is always labelled.
fn sweep_ticks(n: usize, ticks: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    if ticks <= 1 {
        return vec![n];
    }
    let step = ((n - 1) / (ticks - 1)).max(1);
    let mut positions: Vec<usize> = (0..ticks.min(n))
        .map(|j| n - j * step)
        .collect();
    positions.reverse();
    positions
}

/// Draws the chart as an SVG document.
pub fn render_svg(series: &[BarSeries], opt: &ChartOpt) -> Result<String> {
    let xs = sweep_values(series);
    if xs.is_empty() {
        return Err(Error::Render("no bars to draw".to_string()));
    }
    let groups: Vec<f64> = series.iter().map(|s| s.group as f64).collect();
    let top = series
        .iter()
        .flat_map(|s| s.bars.iter().map(|(_, y)| *y))
        .fold(0.0, f64::max)
        .max(1.0)
        * 1.1;

    let nx = xs.len() as f64;
    let nz = series.len() as f64;

    let x_ticks = sweep_ticks(xs.len(), opt.sweep_ticks);
    let x_fmt = |x: &f64| {
        if x_ticks.contains(&(x.round() as usize)) {
            tick_label(&xs, *x, &opt.sweep_label, &opt.sweep_unit)
        } else {
            String::new()
        }
    };
    let z_fmt = |z: &f64| tick_label(&groups, *z, &opt.group_label, "");
    let y_fmt = |y: &f64| format!("{:.0}", y);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (opt.width, opt.height)).into_drawing_area();
        root.fill(&WHITE).map_err(Error::render)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(&opt.caption, ("serif", 20))
            .build_cartesian_3d(0.0..nx + 1.0, 0.0..top, 0.0..nz + 1.0)
            .map_err(Error::render)?;

        chart.with_projection(|mut pb| {
            pb.yaw = opt.yaw;
            pb.pitch = opt.pitch;
            pb.scale = opt.scale;
            pb.into_matrix()
        });

        chart
            .configure_axes()
            .light_grid_style(TRANSPARENT)
            .max_light_lines(1)
            .x_labels(xs.len() + 2)
            .z_labels(series.len() + 2)
            .y_labels(5)
            .x_formatter(&x_fmt)
            .y_formatter(&y_fmt)
            .z_formatter(&z_fmt)
            .draw()
            .map_err(Error::render)?;

        for (j, s) in series.iter().enumerate() {
            let color = COLORS[j % COLORS.len()];
            let z = j as f64 + 1.0;
            log::debug!("group {}: {} bars", s.group, s.bars.len());

            chart
                .draw_series(s.bars.iter().filter_map(|&(x, y)| {
                    let i = xs.iter().position(|v| *v == x)? as f64 + 1.0;
                    let half = BAR_WIDTH / 2.0;
                    Some(Cubiod::new(
                        [(i - half, 0.0, z - half), (i + half, y, z + half)],
                        color.mix(opt.alpha),
                        color.stroke_width(1),
                    ))
                }))
                .map_err(Error::render)?;
        }

        root.present().map_err(Error::render)?;
    }
    Ok(svg)
}

/// Converts an SVG document to a single page PDF.
pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(Error::render)?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(Error::render)
}

/// Renders the chart and writes it as PDF.
pub fn write_pdf(path: &Path, series: &[BarSeries], opt: &ChartOpt) -> Result<()> {
    let svg = render_svg(series, opt)?;
    let pdf = svg_to_pdf(&svg)?;
    fs::write(path, pdf).map_err(|err| Error::io(path, err))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::testdata_dir;
    use anyhow::Result;

    fn series() -> Vec<BarSeries> {
        (2..=4)
            .map(|k| BarSeries {
                group: k,
                bars: vec![(200.0, k as f64 * 3.0), (100.0, 4.0), (300.0, 12.0)],
            })
            .collect()
    }

    #[test]
    fn test_sweep_values() {
        assert_eq!(sweep_values(&series()), vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_tick_label() {
        let xs = [100.0, 200.0];
        assert_eq!(tick_label(&xs, 1.0, "D", "km"), "D=100 km");
        assert_eq!(tick_label(&xs, 2.0, "k", ""), "k=200");
        assert_eq!(tick_label(&xs, 0.0, "D", "km"), "");
        assert_eq!(tick_label(&xs, 1.5, "D", "km"), "");
        assert_eq!(tick_label(&xs, 3.0, "D", "km"), "");
    }

    #[test]
    fn test_sweep_ticks() {
        assert_eq!(sweep_ticks(10, 3), vec![2, 6, 10]);
        assert_eq!(sweep_ticks(11, 3), vec![1, 6, 11]);
        assert_eq!(sweep_ticks(3, 3), vec![1, 2, 3]);
        assert_eq!(sweep_ticks(2, 3), vec![1, 2]);
        assert_eq!(sweep_ticks(4, 1), vec![4]);
        assert!(sweep_ticks(0, 3).is_empty());
    }

    #[test]
    fn test_render_svg() -> Result<()> {
        let svg = render_svg(&series(), &ChartOpt::default())?;
        assert!(svg.contains("<svg"));
        assert!(svg.contains("iterations"));
        Ok(())
    }

    #[test]
    fn test_render_empty() {
        assert!(render_svg(&[], &ChartOpt::default()).is_err());
    }

    #[test]
    fn test_write_pdf() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("iterations.pdf");
        write_pdf(&path, &series(), &ChartOpt::default())?;

        let pdf = fs::read(&path)?;
        assert!(pdf.starts_with(b"%PDF"));
        Ok(())
    }

    #[test]
    fn test_iteration_series() -> Result<()> {
        let study = Study {
            k: vec![3],
            d: vec![5],
            ..Study::rts96()
        };
        let series = iteration_series(&study, &testdata_dir())?;
        assert_eq!(
            series,
            vec![BarSeries {
                group: 3,
                bars: vec![(5.0, 6.0)]
            }]
        );
        Ok(())
    }

    #[test]
    fn test_iteration_series_missing_logs() {
        let study = Study::rts96();
        assert!(iteration_series(&study, &testdata_dir()).is_err());
    }
}
