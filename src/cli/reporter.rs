// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Console summaries with colored formatting

use super::runner::CheckResults;
use crate::engine::{CompGeomResults, MassPropResults, MeshInfo, SliceResults};
use colored::*;
use std::path::PathBuf;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    fn rule() {
        println!("{}", "━".repeat(80).bright_black());
    }

    fn header(title: &str, model: &str) {
        println!();
        Self::rule();
        println!("{} {}", title.bold(), model.cyan());
        Self::rule();
    }

    fn footer(files: &[PathBuf], duration: Duration) {
        for file in files {
            println!("  {} {}", "Wrote:".bright_black(), file.display());
        }
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        Self::rule();
    }

    /// Report intersect/trim results
    pub fn report_comp_geom(model: &str, results: &CompGeomResults, files: &[PathBuf], duration: Duration) {
        Self::header("Comp Geom:", model);
        println!(
            "  {:<24} {:>12} {:>12} {:>12} {:>12}",
            "Component".bold(),
            "Theo_Area",
            "Wet_Area",
            "Theo_Vol",
            "Wet_Vol"
        );
        for comp in &results.components {
            let v = &comp.values;
            println!(
                "  {:<24} {:>12.4} {:>12} {:>12.4} {:>12}",
                comp.name,
                v.theo_area,
                format!("{:.4}", v.wet_area).cyan(),
                v.theo_vol,
                format!("{:.4}", v.wet_vol).cyan()
            );
        }
        let t = &results.totals;
        println!(
            "  {:<24} {:>12.4} {:>12} {:>12.4} {:>12}",
            "Totals".bold(),
            t.theo_area,
            format!("{:.4}", t.wet_area).green().bold(),
            t.theo_vol,
            format!("{:.4}", t.wet_vol).green().bold()
        );
        Self::report_info(&results.info);
        Self::footer(files, duration);
    }

    /// Report mass properties
    pub fn report_mass_prop(model: &str, results: &MassPropResults, files: &[PathBuf], duration: Duration) {
        Self::header("Mass Properties:", model);
        let i = &results.inertia;
        println!("  {} {}", "Mass:".bright_black(), format!("{:.6}", results.total_mass).cyan());
        println!(
            "  {} ({:.6}, {:.6}, {:.6})",
            "CG:".bright_black(),
            results.cg.x,
            results.cg.y,
            results.cg.z
        );
        println!(
            "  {} {:.6} {:.6} {:.6}",
            "Ixx Iyy Izz:".bright_black(),
            i.ixx,
            i.iyy,
            i.izz
        );
        println!(
            "  {} {:.6} {:.6} {:.6}",
            "Ixy Ixz Iyz:".bright_black(),
            i.ixy,
            i.ixz,
            i.iyz
        );
        println!("  {} {:.6}", "Volume:".bright_black(), results.total_volume);
        Self::report_info(&results.info);
        Self::footer(files, duration);
    }

    /// Report a slice table summary
    pub fn report_slice(model: &str, results: &SliceResults, files: &[PathBuf], duration: Duration) {
        Self::header("Slice:", model);
        println!(
            "  {} {} x {}",
            "Stations x sections:".bright_black(),
            results.stations.len(),
            results.section_angles_deg.len()
        );
        println!(
            "  {} {}",
            "Max average area:".bright_black(),
            format!("{:.6}", results.max_average()).cyan()
        );
        Self::report_info(&results.info);
        Self::footer(files, duration);
    }

    /// Report the repair pass
    pub fn report_check(model: &str, results: &CheckResults, duration: Duration) {
        Self::header("Check:", model);
        for stats in &results.components {
            let status = if stats.is_watertight {
                "closed".green()
            } else {
                "open".red()
            };
            println!(
                "  {:<24} {:>8} tris {:>14.6} area {:>14.6} vol  {}",
                stats.name, stats.triangle_count, stats.surface_area, stats.volume, status
            );
        }
        if results.info.is_clean() {
            println!("{} {}", "✅".green(), "All components closed".green());
        }
        Self::report_info(&results.info);
        Self::footer(&[], duration);
    }

    fn report_info(info: &MeshInfo) {
        for line in info.warnings() {
            println!("{} {}", "⚠️ ".yellow(), line.yellow());
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }
}
