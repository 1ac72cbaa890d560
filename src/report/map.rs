//! Interactive Map Module
//! Writes a self-contained Leaflet choropleth of one state's counties,
//! colored by total cases with equal-interval legend classes.

use crate::geo::StateSnapshot;
use crate::report::console::group_thousands;
use geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Number of equal-interval legend classes.
pub const BIN_COUNT: usize = 5;

/// Qualitative palette (ColorBrewer Set2), one color per class.
const PALETTE: [&str; BIN_COUNT] = ["#66c2a5", "#fc8d62", "#8da0cb", "#e78ac9", "#a6d854"];

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Nothing to map: no counties with geometry for this state")]
    EmptySnapshot,
    #[error("Failed to serialize map features: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write map file: {0}")]
    Io(#[from] std::io::Error),
}

/// Class index of `value` under equal-interval binning over [min, max].
pub fn equal_interval_bin(value: f64, min: f64, max: f64, bins: usize) -> usize {
    if max <= min || bins < 2 {
        return 0;
    }
    let width = (max - min) / bins as f64;
    let idx = ((value - min) / width).floor() as usize;
    idx.min(bins - 1)
}

/// The (low, high) bounds of each equal-interval class.
pub fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<(f64, f64)> {
    let width = if max > min {
        (max - min) / bins as f64
    } else {
        0.0
    };
    (0..bins)
        .map(|i| (min + i as f64 * width, min + (i + 1) as f64 * width))
        .collect()
}

fn feature_collection(snapshot: &[StateSnapshot], min: f64, max: f64) -> FeatureCollection {
    let features = snapshot
        .iter()
        .map(|row| {
            let bin = equal_interval_bin(row.total_cases as f64, min, max, BIN_COUNT);
            let mut properties = JsonObject::new();
            properties.insert("Location".into(), json!(row.location));
            properties.insert(
                "Population".into(),
                json!(group_thousands(row.population)),
            );
            properties.insert(
                "Total Cases".into(),
                json!(group_thousands(row.total_cases)),
            );
            properties.insert("fill".into(), json!(PALETTE[bin]));
            Feature {
                bbox: None,
                geometry: Some(row.geometry.clone()),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn legend_rows(min: f64, max: f64) -> String {
    bin_edges(min, max, BIN_COUNT)
        .iter()
        .enumerate()
        .map(|(i, (low, high))| {
            format!(
                "<div><i style=\"background:{}\"></i>{} - {}</div>",
                PALETTE[i],
                group_thousands(low.round() as i64),
                group_thousands(high.round() as i64)
            )
        })
        .collect::<Vec<_>>()
        .join("\n      ")
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>__TITLE__</title>
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <style>
    html, body, #map { height: 100%; margin: 0; }
    .legend {
      background: white;
      padding: 8px 12px;
      font: 14px/18px sans-serif;
      box-shadow: 0 0 12px rgba(0,0,0,0.3);
      border-radius: 4px;
    }
    .legend i {
      width: 16px;
      height: 16px;
      float: left;
      margin-right: 8px;
      opacity: 0.8;
    }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    var counties = __GEOJSON__;

    var map = L.map('map');
    L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
      attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);

    var layer = L.geoJSON(counties, {
      style: function (feature) {
        return {
          fillColor: feature.properties.fill,
          fillOpacity: 0.7,
          color: '#555',
          weight: 1
        };
      },
      onEachFeature: function (feature, layer) {
        layer.bindPopup(
          '<b>' + feature.properties['Location'] + '</b><br>' +
          'Population: ' + feature.properties['Population'] + '<br>' +
          'Total Cases: ' + feature.properties['Total Cases']
        );
      }
    }).addTo(map);
    map.fitBounds(layer.getBounds());

    var legend = L.control({position: 'bottomright'});
    legend.onAdd = function () {
      var div = L.DomUtil.create('div', 'legend');
      div.innerHTML = '<b>Total Cases</b><br>' + `__LEGEND__`;
      return div;
    };
    legend.addTo(map);
  </script>
</body>
</html>
"#;

/// Render the complete choropleth HTML document for one state.
pub fn render_map_html(state: &str, snapshot: &[StateSnapshot]) -> Result<String, MapError> {
    if snapshot.is_empty() {
        return Err(MapError::EmptySnapshot);
    }

    let min = snapshot
        .iter()
        .map(|row| row.total_cases)
        .min()
        .unwrap_or(0) as f64;
    let max = snapshot
        .iter()
        .map(|row| row.total_cases)
        .max()
        .unwrap_or(0) as f64;

    let collection = feature_collection(snapshot, min, max);
    let geojson = serde_json::to_string(&collection)?;

    Ok(TEMPLATE
        .replace("__TITLE__", &format!("{state} COVID-19 County Map"))
        .replace("__GEOJSON__", &geojson)
        .replace("__LEGEND__", &legend_rows(min, max)))
}

/// Write `{state}_covid_map.html` in the working directory, overwriting any
/// previous run's file.
pub fn write_state_map(state: &str, snapshot: &[StateSnapshot]) -> Result<PathBuf, MapError> {
    let html = render_map_html(state, snapshot)?;
    let path = PathBuf::from(format!("{state}_covid_map.html"));
    fs::write(&path, html)?;
    info!(path = %path.display(), "state map written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Geometry, Value};

    fn snapshot_row(location: &str, total_cases: i64) -> StateSnapshot {
        let ring = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ];
        StateSnapshot {
            location: location.to_string(),
            population: 1000,
            total_cases,
            geometry: Geometry::new(Value::Polygon(vec![ring])),
        }
    }

    #[test]
    fn bins_have_equal_width_and_cover_the_range() {
        assert_eq!(equal_interval_bin(0.0, 0.0, 100.0, 5), 0);
        assert_eq!(equal_interval_bin(19.9, 0.0, 100.0, 5), 0);
        assert_eq!(equal_interval_bin(20.0, 0.0, 100.0, 5), 1);
        assert_eq!(equal_interval_bin(99.9, 0.0, 100.0, 5), 4);
        // max value lands in the top class, not one past it
        assert_eq!(equal_interval_bin(100.0, 0.0, 100.0, 5), 4);
        // degenerate range collapses to a single class
        assert_eq!(equal_interval_bin(42.0, 42.0, 42.0, 5), 0);
    }

    #[test]
    fn edges_partition_the_range() {
        let edges = bin_edges(0.0, 100.0, 5);
        assert_eq!(edges.len(), 5);
        assert_eq!(edges[0], (0.0, 20.0));
        assert_eq!(edges[4], (80.0, 100.0));
        for window in edges.windows(2) {
            assert_eq!(window[0].1, window[1].0);
        }
    }

    #[test]
    fn rendered_map_embeds_counties_and_legend() {
        let snapshot = vec![
            snapshot_row("Cook, Illinois, US", 120),
            snapshot_row("Lake, Illinois, US", 30),
        ];
        let html = render_map_html("Illinois", &snapshot).unwrap();
        assert!(html.contains("Illinois COVID-19 County Map"));
        assert!(html.contains("leaflet"));
        assert!(html.contains("Cook, Illinois, US"));
        assert!(html.contains("Lake, Illinois, US"));
        for color in PALETTE {
            assert!(html.contains(color));
        }
    }

    #[test]
    fn empty_snapshot_is_an_error() {
        assert!(matches!(
            render_map_html("Illinois", &[]),
            Err(MapError::EmptySnapshot)
        ));
    }

    #[test]
    fn map_file_lands_where_requested() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = vec![snapshot_row("Cook, Illinois, US", 120)];
        let html = render_map_html("Illinois", &snapshot).unwrap();
        let path = dir.path().join("Illinois_covid_map.html");
        std::fs::write(&path, &html).unwrap();
        assert!(path.exists());
    }
}
