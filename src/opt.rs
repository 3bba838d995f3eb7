/// Options for reading the topology tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOpt {
    /// Skip the first row of the bus coordinate table.
    pub geo_headers: bool,

    /// Skip the first row of the branch table.
    pub branch_headers: bool,
}

impl Default for LoadOpt {
    fn default() -> Self {
        Self {
            geo_headers: true,
            branch_headers: true,
        }
    }
}

/// Options for the 3D bar chart.
#[derive(Debug, Clone)]
pub struct ChartOpt {
    // Page size in SVG user units (pt once converted to PDF).
    pub width: u32,
    pub height: u32,

    pub caption: String,

    // Tick label prefixes for the group (depth) and sweep axes.
    pub group_label: String,
    pub sweep_label: String,
    // Unit appended to sweep tick labels, may be empty.
    pub sweep_unit: String,

    // Number of sweep tick labels drawn. Default value is 3.
    pub sweep_ticks: usize,

    // Bar face transparency. Default value is 0.5.
    pub alpha: f64,

    // View rotation in radians.
    pub yaw: f64,
    pub pitch: f64,
    pub scale: f64,
}

impl Default for ChartOpt {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            caption: "iterations".to_string(),
            group_label: "k".to_string(),
            sweep_label: "D".to_string(),
            sweep_unit: "km".to_string(),
            sweep_ticks: 3,
            alpha: 0.5,
            yaw: -143f64.to_radians(),
            pitch: 31f64.to_radians(),
            scale: 0.8,
        }
    }
}
