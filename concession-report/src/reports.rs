use anyhow::Result;
use colored::Colorize;
use concession_core::{ConcessionReport, SeasonalComparison, TrendSeries};
use std::io::Write;

/// Format an integer with comma thousands separators.
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn whole(value: f64) -> String {
    thousands(concession_core::numbers::round_f64_to_i64(value))
}

/// Opening paragraph describing the concession.
pub fn profile_paragraph(report: &ConcessionReport) -> String {
    let profile = &report.profile;
    format!(
        "The {} hunting block, outfitted by {}, is {} square kilometers. The total fees \
         associated with this concession are ${}, amounting to ${} per square kilometer. \
         There are {} present in this concession.",
        profile.name,
        profile.outfitter,
        whole(profile.area_km2),
        whole(profile.total_fees),
        thousands(profile.cost_per_km2),
        profile.wildlife,
    )
}

pub fn deforestation_paragraph(report: &ConcessionReport) -> String {
    format!(
        "Annual tree cover loss detected at 30-meter resolution suggests that {} percent of \
         {} was impacted by tree cover loss ({} hectares).",
        report.deforestation.percent_of_area,
        report.profile.name,
        report.deforestation.total_hectares,
    )
}

pub fn water_paragraph(report: &ConcessionReport) -> String {
    format!(
        "Of the {} square kilometers in {}, {} ({} percent) have been, at some point, \
         characterized by surface water or surface water change.",
        whole(report.profile.area_km2),
        report.profile.name,
        report.water.total_area_km2,
        report.water.percent_of_area,
    )
}

pub fn season_paragraph(label: &str, season: &SeasonalComparison) -> String {
    let anomalous = season.anomalous_days();
    let baseline = match (season.historical_years.first(), season.historical_years.last()) {
        (Some(first), Some(last)) => format!("{first}-{last}"),
        _ => "no earlier years".to_string(),
    };
    if season.current.is_empty() {
        return format!(
            "No {label} observations for {} to compare against {baseline}.",
            season.cutoff_year
        );
    }
    format!(
        "{} days of {label} in {} compared against the 95 percent band of {baseline}: {} \
         anomalous.",
        season.current.len(),
        season.cutoff_year,
        anomalous.len(),
    )
}

fn trend_line(trend: &TrendSeries) -> String {
    match (trend.smoothed.first(), trend.smoothed.last()) {
        (Some(first), Some(last)) => format!(
            "{} observations, window ±{}: {:.2} ({}) to {:.2} ({})",
            trend.raw.len(),
            trend.window,
            first.value,
            first.date,
            last.value,
            last.date
        ),
        _ => format!("no observations (window ±{})", trend.window),
    }
}

pub fn generate_console_report(out: &mut dyn Write, report: &ConcessionReport) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        format!("🌍 {}", report.profile.name).bright_cyan().bold()
    )?;
    writeln!(out, "{}", "=".repeat(30).cyan())?;
    writeln!(out, "{}", profile_paragraph(report))?;
    if let Some(population) = report.profile.population {
        writeln!(out, "Estimated population: {}", whole(population))?;
    }
    writeln!(out)?;

    writeln!(out, "{}", "🌿 Vegetation".bright_green().bold())?;
    writeln!(
        out,
        "{}: {} observations",
        report.vegetation_index.label(),
        report.vegetation.len()
    )?;
    writeln!(
        out,
        "Evapotranspiration: {}",
        trend_line(&report.evapotranspiration)
    )?;
    writeln!(out)?;

    writeln!(out, "{}", "🪓 Deforestation".bright_red().bold())?;
    writeln!(out, "{}", deforestation_paragraph(report))?;
    for year in &report.deforestation.years {
        writeln!(out, "  {}: {} ha", year.year, year.hectares)?;
    }
    writeln!(out)?;

    writeln!(out, "{}", "💧 Surface water".bright_blue().bold())?;
    writeln!(out, "{}", water_paragraph(report))?;
    for class in &report.water.classes {
        writeln!(
            out,
            "  {:30} {:>10.2} km² ({}%)",
            class.label, class.area_km2, class.share_percent
        )?;
    }
    writeln!(out)?;

    writeln!(out, "{}", "🔥 Fires".bright_yellow().bold())?;
    let total_fires: f64 = report.fires.iter().map(|p| p.value).sum();
    writeln!(
        out,
        "{} fire detections over {} days",
        whole(total_fires),
        report.fires.len()
    )?;
    writeln!(out, "{}", season_paragraph("fires", &report.fire_season))?;
    let anomalous = report.fire_season.anomalous_days();
    if !anomalous.is_empty() {
        let days: Vec<String> = anomalous.iter().map(u32::to_string).collect();
        writeln!(out, "  Anomalous days: {}", days.join(", ").red())?;
    }

    if let Some(carbon) = &report.carbon {
        writeln!(out)?;
        writeln!(out, "{}", "🌳 Carbon".bright_green().bold())?;
        writeln!(
            out,
            "{} Mt of above-ground carbon ({} t/ha), {} percent in forest",
            carbon.total_megatonnes, carbon.per_hectare, carbon.forest_percent
        )?;
    }

    if let Some(weather) = &report.weather {
        writeln!(out)?;
        writeln!(
            out,
            "{}",
            format!("🌦  Weather: {}", weather.variable).bright_magenta().bold()
        )?;
        writeln!(out, "{}", trend_line(&weather.trend))?;
        writeln!(out, "{}", season_paragraph(&weather.variable, &weather.season))?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &ConcessionReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &ConcessionReport) -> Result<()> {
    writeln!(out, "# {} Concession Report\n", report.profile.name)?;
    writeln!(out, "{}\n", profile_paragraph(report))?;

    writeln!(out, "## Vegetation\n")?;
    writeln!(
        out,
        "- **{}**: {} observations",
        report.vegetation_index.label(),
        report.vegetation.len()
    )?;
    writeln!(
        out,
        "- **Evapotranspiration**: {}\n",
        trend_line(&report.evapotranspiration)
    )?;

    writeln!(out, "## Deforestation\n")?;
    writeln!(out, "{}\n", deforestation_paragraph(report))?;
    if !report.deforestation.years.is_empty() {
        writeln!(out, "| Year | Hectares |")?;
        writeln!(out, "|------|----------|")?;
        for year in &report.deforestation.years {
            writeln!(out, "| {} | {} |", year.year, year.hectares)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "## Surface water\n")?;
    writeln!(out, "{}\n", water_paragraph(report))?;
    if !report.water.classes.is_empty() {
        writeln!(out, "| Class | Area (km²) | Share (%) |")?;
        writeln!(out, "|-------|------------|-----------|")?;
        for class in &report.water.classes {
            writeln!(
                out,
                "| {} | {} | {} |",
                class.label, class.area_km2, class.share_percent
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "## Fires\n")?;
    writeln!(out, "{}\n", season_paragraph("fires", &report.fire_season))?;

    if let Some(carbon) = &report.carbon {
        writeln!(out, "## Carbon\n")?;
        writeln!(
            out,
            "- **Total**: {} Mt\n- **Forest share**: {}%\n",
            carbon.total_megatonnes, carbon.forest_percent
        )?;
    }

    if let Some(weather) = &report.weather {
        writeln!(out, "## Weather: {}\n", weather.variable)?;
        writeln!(out, "- {}", trend_line(&weather.trend))?;
        writeln!(out, "- {}\n", season_paragraph(&weather.variable, &weather.season))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use concession_core::{
        ConcessionProfile, DeforestationSummary, IndicatorPresence, VegetationIndex, WaterSummary,
    };

    fn sample_report() -> ConcessionReport {
        ConcessionReport {
            profile: ConcessionProfile {
                name: "Block-7".to_string(),
                outfitter: "Kwacha Outfitters".to_string(),
                area_km2: 1_200.0,
                total_fees: 600_000.0,
                cost_per_km2: 500,
                wildlife: IndicatorPresence::Single("Lion".to_string()),
                population: None,
            },
            vegetation_index: VegetationIndex::Ndvi,
            vegetation: Vec::new(),
            evapotranspiration: TrendSeries {
                window: 50,
                raw: Vec::new(),
                smoothed: Vec::new(),
            },
            deforestation: DeforestationSummary {
                total_hectares: 3_600.0,
                percent_of_area: 3.0,
                years: Vec::new(),
            },
            water: WaterSummary {
                total_area_km2: 0.0,
                percent_of_area: 0.0,
                classes: Vec::new(),
            },
            fires: Vec::new(),
            fire_season: SeasonalComparison {
                cutoff_year: 2020,
                historical_years: Vec::new(),
                band: Vec::new(),
                current: Vec::new(),
            },
            carbon: None,
            weather: None,
        }
    }

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(60_000), "60,000");
        assert_eq!(thousands(-1_234_567), "-1,234,567");
    }

    #[test]
    fn profile_paragraph_interpolates_scalars() {
        let text = profile_paragraph(&sample_report());
        assert!(text.contains("outfitted by Kwacha Outfitters"));
        assert!(text.contains("is 1,200 square kilometers"));
        assert!(text.contains("$600,000"));
        assert!(text.contains("$500 per square kilometer"));
        assert!(text.contains("There are only documented Lions present"));
    }

    #[test]
    fn markdown_report_has_sections() {
        let mut buffer = Vec::new();
        generate_markdown_report(&mut buffer, &sample_report()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("# Block-7 Concession Report"));
        assert!(text.contains("## Deforestation"));
        assert!(text.contains("3 percent of Block-7"));
        assert!(text.contains("No fires observations for 2020"));
        assert!(!text.contains("## Carbon"));
    }

    #[test]
    fn json_report_round_trips() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &sample_report()).unwrap();
        let parsed: ConcessionReport = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed, sample_report());
    }
}
