//! Geographic overlay of a transmission network as a Leaflet HTML page.

use crate::error::{Error, Result};
use crate::format::format_position_vec;
use crate::heuristic::InterdictionRecord;
use crate::topology::Topology;
use derive_builder::Builder;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

const TILES: &str = "http://{s}.basemaps.cartocdn.com/light_nolabels/{z}/{x}/{y}.png";
const ATTRIBUTION: &str = "&copy; <a href=\"http://www.openstreetmap.org/copyright\">OpenStreetMap</a> \
     contributors, &copy; <a href=\"http://cartodb.com/attributions\">CartoDB</a>";

/// Stroke options of a Leaflet path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
}

/// Stroke and fill options of a Leaflet circle marker or polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,

    /// Circle radius in pixels. Unused for polygons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(default, setter(into))]
pub struct MapOpt {
    /// Initial map centre `[lat, lon]`.
    pub center: [f64; 2],
    pub zoom: u8,

    pub tiles: String,
    pub attribution: String,

    pub zoom_control: bool,
    pub prefer_canvas: bool,

    /// CSS size of the map element.
    pub width: String,
    pub height: String,

    pub boundary_style: AreaStyle,
    pub branch_style: LineStyle,
    pub bus_style: AreaStyle,

    pub interdicted_style: LineStyle,
    /// Radius is replaced by the bus share of the total shed.
    pub shed_style: AreaStyle,
}

impl Default for MapOpt {
    fn default() -> Self {
        Self {
            center: [42.397411, -114.068631],
            zoom: 5,
            tiles: TILES.to_string(),
            attribution: ATTRIBUTION.to_string(),
            zoom_control: false,
            prefer_canvas: true,
            width: "38%".to_string(),
            height: "95%".to_string(),
            boundary_style: AreaStyle {
                color: "black".to_string(),
                weight: 1.0,
                opacity: 0.6,
                fill_color: "yellow".to_string(),
                fill_opacity: 0.2,
                radius: None,
            },
            branch_style: LineStyle {
                color: "green".to_string(),
                weight: 1.5,
                opacity: 1.0,
            },
            bus_style: AreaStyle {
                color: "black".to_string(),
                weight: 1.5,
                opacity: 1.0,
                fill_color: "brown".to_string(),
                fill_opacity: 1.0,
                radius: Some(2.0),
            },
            interdicted_style: LineStyle {
                color: "red".to_string(),
                weight: 3.0,
                opacity: 1.0,
            },
            shed_style: AreaStyle {
                color: "darkred".to_string(),
                weight: 1.0,
                opacity: 1.0,
                fill_color: "red".to_string(),
                fill_opacity: 0.5,
                radius: None,
            },
        }
    }
}

/// Reads a GeoJSON boundary file. The content is passed to Leaflet as is.
pub fn read_geojson(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    serde_json::from_str(&text).map_err(|err| Error::parse("GeoJSON", err.line(), err.to_string()))
}

/// Builds the data and options consumed by the page script.
///
/// Every bus referenced by a branch, an interdicted branch or a shed entry
/// must have a position.
pub fn map_config(
    topology: &Topology,
    boundaries: &[Value],
    record: Option<&InterdictionRecord>,
    opt: &MapOpt,
) -> Result<Value> {
    let branches = topology
        .branch
        .iter()
        .enumerate()
        .map(|(i, br)| {
            let path = topology.branch_path(br, &format!("branch {}", i + 1))?;
            Ok(path.map(|p| p.lat_lon()))
        })
        .collect::<Result<Vec<_>>>()?;

    let buses: Vec<Value> = topology
        .position
        .iter()
        .map(|(bus, p)| json!({ "id": bus, "position": p.lat_lon() }))
        .collect();

    let mut interdicted = Vec::new();
    let mut shed = Vec::new();
    if let Some(record) = record {
        for br in &record.branch {
            let context = format!("interdicted branch {}-{}", br.from_bus, br.to_bus);
            let path = topology.branch_path(br, &context)?;
            log::debug!("{}: {}", context, format_position_vec(&path));
            interdicted.push(path.map(|p| p.lat_lon()));
        }

        for &bus in record.shed.keys() {
            topology.position(bus, "load shed")?;
        }

        match record.shed_radii() {
            Some(radii) => {
                for (bus, radius) in radii {
                    let p = topology.position(bus, "load shed")?;
                    shed.push(json!({
                        "id": bus,
                        "position": p.lat_lon(),
                        "shed": record.shed[&bus],
                        "radius": radius,
                    }));
                }
            }
            None => log::info!("no load shed"),
        }
    }

    Ok(json!({
        "center": opt.center,
        "zoom": opt.zoom,
        "tiles": opt.tiles,
        "attribution": opt.attribution,
        "zoomControl": opt.zoom_control,
        "preferCanvas": opt.prefer_canvas,
        "width": opt.width,
        "height": opt.height,
        "boundaryStyle": opt.boundary_style,
        "branchStyle": opt.branch_style,
        "busStyle": opt.bus_style,
        "interdictedStyle": opt.interdicted_style,
        "shedStyle": opt.shed_style,
        "boundaries": boundaries,
        "branches": branches,
        "buses": buses,
        "interdicted": interdicted,
        "shed": shed,
    }))
}

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"></script>
  <style>
    html, body { width: 100%; height: 100%; margin: 0; padding: 0; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    var config = __CONFIG__;

    var el = document.getElementById('map');
    el.style.width = config.width;
    el.style.height = config.height;

    var map = L.map('map', {
      center: config.center,
      zoom: config.zoom,
      zoomControl: config.zoomControl,
      preferCanvas: config.preferCanvas
    });
    L.tileLayer(config.tiles, { attribution: config.attribution }).addTo(map);

    config.boundaries.forEach(function (data) {
      L.geoJSON(data, { style: function () { return config.boundaryStyle; } }).addTo(map);
    });
    config.branches.forEach(function (path) {
      L.polyline(path, config.branchStyle).addTo(map);
    });
    config.interdicted.forEach(function (path) {
      L.polyline(path, config.interdictedStyle).addTo(map);
    });
    config.buses.forEach(function (bus) {
      L.circleMarker(bus.position, config.busStyle).bindTooltip('bus ' + bus.id).addTo(map);
    });
    config.shed.forEach(function (bus) {
      var style = Object.assign({}, config.shedStyle, { radius: bus.radius });
      L.circleMarker(bus.position, style)
        .bindTooltip('bus ' + bus.id + ': ' + bus.shed + ' MW')
        .addTo(map);
    });
  </script>
</body>
</html>
"#;

/// Renders the overlay as a standalone HTML page.
pub fn render_map(
    topology: &Topology,
    boundaries: &[Value],
    record: Option<&InterdictionRecord>,
    opt: &MapOpt,
) -> Result<String> {
    let config = map_config(topology, boundaries, record, opt)?;
    // `</` would end the script element early.
    let config = config.to_string().replace("</", "<\\/");
    Ok(PAGE.replace("__CONFIG__", &config))
}

pub fn write_map(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).map_err(|err| Error::io(path, err))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::read_log;
    use crate::opt::LoadOpt;
    use crate::tests::testdata;
    use crate::topology::{load_topology, Branch};
    use anyhow::Result;

    fn topology() -> Result<Topology> {
        Ok(load_topology(
            &testdata("rts_geo.csv"),
            &testdata("rts_branches.csv"),
            &LoadOpt::default(),
        )?)
    }

    fn len(config: &Value, key: &str) -> usize {
        config[key].as_array().map_or(0, |a| a.len())
    }

    #[test]
    fn test_map_config() -> Result<()> {
        let topology = topology()?;
        let boundary = read_geojson(&testdata("states.json"))?;
        let config = map_config(&topology, &[boundary], None, &MapOpt::default())?;

        assert_eq!(len(&config, "branches"), topology.branch.len());
        assert_eq!(len(&config, "buses"), topology.position.len());
        assert_eq!(len(&config, "boundaries"), 1);
        assert_eq!(len(&config, "shed"), 0);
        assert_eq!(config["branches"][0], json!([[42.1, -114.3], [42.4, -113.9]]));
        assert_eq!(config["busStyle"]["fillColor"], "brown");
        assert_eq!(config["busStyle"]["radius"], 2.0);
        assert_eq!(config["zoomControl"], false);
        Ok(())
    }

    #[test]
    fn test_shed_layer() -> Result<()> {
        let topology = topology()?;
        let log = read_log(&testdata("24-3-plain-heuristic.txt"))?;
        let config = map_config(&topology, &[], Some(&log.record), &MapOpt::default())?;

        assert_eq!(len(&config, "interdicted"), 3);
        assert_eq!(len(&config, "shed"), 3);

        let radius: f64 = config["shed"]
            .as_array()
            .map_or(0.0, |a| a.iter().filter_map(|b| b["radius"].as_f64()).sum());
        assert!((radius - 100.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_zero_shed() -> Result<()> {
        let topology = topology()?;
        let mut record = InterdictionRecord::default();
        record.branch.push(Branch::new(101, 102));
        record.shed.insert(102, 0.0);

        let config = map_config(&topology, &[], Some(&record), &MapOpt::default())?;
        assert_eq!(len(&config, "interdicted"), 1);
        assert_eq!(len(&config, "shed"), 0);
        Ok(())
    }

    #[test]
    fn test_unknown_bus() -> Result<()> {
        let topology = topology()?;
        let mut record = InterdictionRecord::default();
        record.shed.insert(999, 1.0);

        let err = map_config(&topology, &[], Some(&record), &MapOpt::default());
        assert!(matches!(err, Err(Error::Lookup { bus: 999, .. })));
        Ok(())
    }

    #[test]
    fn test_unknown_bus_without_shed() -> Result<()> {
        let topology = topology()?;

        // zero total shed
        let mut record = InterdictionRecord::default();
        record.shed.insert(999, 0.0);
        let err = map_config(&topology, &[], Some(&record), &MapOpt::default());
        assert!(matches!(err, Err(Error::Lookup { bus: 999, .. })));

        // zero entry next to a shedding bus
        record.shed.insert(101, 5.0);
        let err = map_config(&topology, &[], Some(&record), &MapOpt::default());
        assert!(matches!(err, Err(Error::Lookup { bus: 999, .. })));
        Ok(())
    }

    #[test]
    fn test_render_map() -> Result<()> {
        let topology = topology()?;
        let opt = MapOptBuilder::default().zoom(6u8).width("100%").build()?;
        let html = render_map(&topology, &[json!({ "name": "</script>" })], None, &opt)?;

        assert!(html.contains("\"zoom\":6"));
        assert!(html.contains("\"width\":\"100%\""));
        assert!(!html.contains("__CONFIG__"));
        assert_eq!(html.matches("</script>").count(), 2);

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("output.html");
        write_map(&path, &html)?;
        assert_eq!(fs::read_to_string(&path)?, html);
        Ok(())
    }
}
