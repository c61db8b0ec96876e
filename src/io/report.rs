// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flat text, CSV and tab-separated reports

use crate::engine::{CompGeomResults, MassPropResults, MeshInfo, SliceKind, SliceResults};
use crate::error::{EngineError, EngineResult};
use chrono::Utc;
use std::fs;
use std::path::Path;

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn push_warnings(out: &mut String, info: &MeshInfo) {
    let warnings = info.warnings();
    if warnings.is_empty() {
        return;
    }
    out.push('\n');
    for line in warnings {
        out.push_str(&line);
        out.push('\n');
    }
}

/// Write a finished report to disk
pub fn write_report(path: &Path, content: &str) -> EngineResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| EngineError::io(dir, e))?;
    }
    fs::write(path, content).map_err(|e| EngineError::io(path, e))
}

/// Per-component theoretical and wetted area/volume table
pub fn comp_geom_text(results: &CompGeomResults) -> String {
    let mut out = String::new();
    out.push_str("...Comp Geom...\n");
    out.push_str(&format!("{}\n", timestamp()));
    out.push_str(&format!("{} components\n", results.components.len()));
    if results.half_model {
        out.push_str("Half model (y >= 0)\n");
    }
    out.push('\n');

    out.push_str(&format!(
        "{:>16} {:>16} {:>16} {:>16}  {}\n",
        "Theo_Area", "Wet_Area", "Theo_Vol", "Wet_Vol", "Name"
    ));
    for comp in &results.components {
        let v = &comp.values;
        out.push_str(&format!(
            "{:>16.6} {:>16.6} {:>16.6} {:>16.6}  {}\n",
            v.theo_area, v.wet_area, v.theo_vol, v.wet_vol, comp.name
        ));
    }
    out.push_str(&format!("{}\n", "-".repeat(76)));
    let t = &results.totals;
    out.push_str(&format!(
        "{:>16.6} {:>16.6} {:>16.6} {:>16.6}  {}\n",
        t.theo_area, t.wet_area, t.theo_vol, t.wet_vol, "Totals"
    ));

    out.push_str(&format!(
        "\nExterior: {} triangles, {} nodes\n",
        results.num_exterior_tris, results.num_exterior_nodes
    ));
    push_warnings(&mut out, &results.info);
    out
}

/// Comma-separated area/volume table with a totals row
pub fn comp_geom_csv(results: &CompGeomResults) -> String {
    let mut out = String::from("Name, Theo_Area, Wet_Area, Theo_Vol, Wet_Vol\n");
    for comp in &results.components {
        let v = &comp.values;
        out.push_str(&format!(
            "{}, {:.9}, {:.9}, {:.9}, {:.9}\n",
            comp.name, v.theo_area, v.wet_area, v.theo_vol, v.wet_vol
        ));
    }
    let t = &results.totals;
    out.push_str(&format!(
        "Totals, {:.9}, {:.9}, {:.9}, {:.9}\n",
        t.theo_area, t.wet_area, t.theo_vol, t.wet_vol
    ));
    out
}

/// Tab-separated drag build-up inputs, one row per component
pub fn drag_build_up_tsv(results: &CompGeomResults) -> String {
    let header = [
        "Name",
        "Theo_Area",
        "Wet_Area",
        "Min_Chord",
        "Avg_Chord",
        "Max_Chord",
        "Min_TC",
        "Avg_TC",
        "Max_TC",
        "Avg_Sweep",
        "Length",
        "Max_Xsec_Area",
        "Length_Dia",
    ];
    let mut out = header.join("\t");
    out.push('\n');

    for comp in &results.components {
        let d = comp.drag.unwrap_or_default();
        let values = [
            comp.values.theo_area,
            comp.values.wet_area,
            d.min_chord,
            d.avg_chord,
            d.max_chord,
            d.min_tc,
            d.avg_tc,
            d.max_tc,
            d.avg_sweep,
            d.length,
            d.max_xsec_area,
            d.length_to_diameter,
        ];
        out.push_str(&comp.name);
        for v in values {
            out.push_str(&format!("\t{:.6}", v));
        }
        out.push('\n');
    }
    out
}

/// Mass, centre of gravity and inertia of the model and each component
pub fn mass_prop_text(results: &MassPropResults) -> String {
    let mut out = String::new();
    out.push_str("...Mass Properties...\n");
    out.push_str(&format!("{}\n", timestamp()));
    out.push_str(&format!("{} slices\n\n", results.num_slices));

    let i = &results.inertia;
    out.push_str(&format!("{:>16.6} Total Mass\n", results.total_mass));
    out.push_str(&format!(
        "{:>16.6} {:>16.6} {:>16.6} Center of Gravity\n",
        results.cg.x, results.cg.y, results.cg.z
    ));
    out.push_str(&format!(
        "{:>16.6} {:>16.6} {:>16.6} Ixx, Iyy, Izz\n",
        i.ixx, i.iyy, i.izz
    ));
    out.push_str(&format!(
        "{:>16.6} {:>16.6} {:>16.6} Ixy, Ixz, Iyz\n",
        i.ixy, i.ixz, i.iyz
    ));
    out.push_str(&format!("{:>16.6} Volume\n\n", results.total_volume));

    out.push_str(&format!(
        "{:<20} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
        "Name", "Mass", "cgX", "cgY", "cgZ", "Ixx", "Iyy", "Izz", "Ixy", "Ixz", "Iyz", "Volume"
    ));
    for comp in &results.components {
        let i = &comp.inertia;
        out.push_str(&format!(
            "{:<20} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5}\n",
            comp.name, comp.mass, comp.cg.x, comp.cg.y, comp.cg.z,
            i.ixx, i.iyy, i.izz, i.ixy, i.ixz, i.iyz, comp.volume
        ));
    }
    for pm in &results.point_masses {
        let i = &pm.inertia;
        out.push_str(&format!(
            "{:<20} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5}\n",
            pm.name, pm.mass, pm.location.x, pm.location.y, pm.location.z,
            i.ixx, i.iyy, i.izz, i.ixy, i.ixz, i.iyz, 0.0
        ));
    }
    push_warnings(&mut out, &results.info);
    out
}

/// Station table with one column per section plus total and average
pub fn slice_text(results: &SliceResults) -> String {
    let mut out = String::new();
    out.push_str("...Slice...\n");
    out.push_str(&format!("{}\n", timestamp()));
    match results.kind {
        SliceKind::Planar { axis } => out.push_str(&format!("Planar slices normal to {:?}\n", axis)),
        SliceKind::Conic { half_angle_deg } => {
            out.push_str(&format!("Conic slices, half angle {:.3} deg\n", half_angle_deg))
        }
        SliceKind::Awave {
            mach,
            mach_angle_deg,
        } => out.push_str(&format!(
            "AWAVE slices, Mach {:.4}, Mach angle {:.3} deg, {} sections\n",
            mach,
            mach_angle_deg,
            results.section_angles_deg.len()
        )),
    }
    out.push_str(&format!("{} stations\n\n", results.stations.len()));

    out.push_str(&format!("{:>14}", "Station"));
    if results.section_angles_deg.len() > 1 {
        for theta in &results.section_angles_deg {
            out.push_str(&format!(" {:>14}", format!("Theta_{:.1}", theta)));
        }
    } else {
        out.push_str(&format!(" {:>14}", "Area"));
    }
    out.push_str(&format!(" {:>14} {:>14}\n", "Total", "Average"));

    for (k, station) in results.stations.iter().enumerate() {
        out.push_str(&format!("{:>14.6}", station));
        for area in &results.areas[k] {
            out.push_str(&format!(" {:>14.6}", area));
        }
        out.push_str(&format!(
            " {:>14.6} {:>14.6}\n",
            results.station_total(k),
            results.station_average(k)
        ));
    }
    out.push_str(&format!("\nMax average area: {:.6}\n", results.max_average()));
    push_warnings(&mut out, &results.info);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SliceAxis;
    use crate::engine::ComponentResult;
    use crate::geometry::{AreaVolume, DragFactors};

    fn sample() -> CompGeomResults {
        let values = AreaVolume {
            theo_area: 6.0,
            wet_area: 5.0,
            theo_vol: 1.0,
            wet_vol: 1.0,
        };
        CompGeomResults {
            components: vec![ComponentResult {
                name: "pod".to_string(),
                id: "pod".to_string(),
                values,
                num_tris: 12,
                drag: Some(DragFactors {
                    length: 2.0,
                    ..Default::default()
                }),
            }],
            totals: values,
            info: MeshInfo {
                num_open_meshes_deleted: 1,
                ..Default::default()
            },
            half_model: false,
            num_exterior_tris: 10,
            num_exterior_nodes: 8,
        }
    }

    #[test]
    fn test_csv_rows() {
        let csv = comp_geom_csv(&sample());
        let rows: Vec<Vec<&str>> = csv
            .lines()
            .map(|l| l.split(',').map(str::trim).collect())
            .collect();
        assert_eq!(rows[0], ["Name", "Theo_Area", "Wet_Area", "Theo_Vol", "Wet_Vol"]);
        assert_eq!(rows[1][0], "pod");
        assert_eq!(rows[1][2].parse::<f64>().unwrap(), 5.0);
        assert_eq!(rows.last().unwrap()[0], "Totals");
    }

    #[test]
    fn test_text_report_carries_warnings() {
        let text = comp_geom_text(&sample());
        assert!(text.contains("Totals"));
        assert!(text.contains("WARNING: 1 open meshes removed"));
    }

    #[test]
    fn test_drag_build_up_columns() {
        let tsv = drag_build_up_tsv(&sample());
        let lines: Vec<&str> = tsv.lines().collect();
        let header: Vec<&str> = lines[0].split('\t').collect();
        let row: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(header.len(), row.len());
        let length = header.iter().position(|h| *h == "Length").unwrap();
        assert_eq!(row[length].parse::<f64>().unwrap(), 2.0);
    }

    #[test]
    fn test_slice_table() {
        let results = SliceResults {
            kind: SliceKind::Planar { axis: SliceAxis::X },
            stations: vec![0.25, 0.75],
            section_angles_deg: vec![0.0],
            areas: vec![vec![1.0], vec![0.5]],
            info: MeshInfo::default(),
        };
        let text = slice_text(&results);
        assert!(text.contains("Planar slices normal to X"));
        assert!(text.contains("Max average area: 1.000000"));
        assert!(!text.contains("WARNING"));
    }
}
