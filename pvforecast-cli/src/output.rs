use std::fmt::Write;

use pvforecast_core::{DailyForecastData, HourlyForecastData};

pub fn render_hourly(data: &HourlyForecastData) -> String {
    if data.is_empty() {
        return "No hourly forecast available.".to_string();
    }

    let mut out = String::new();
    for f in data {
        match f.irradiance {
            Some(value) => {
                let _ = writeln!(out, "{:<22} {:>6} W/m²", f.timestamp, value);
            }
            None => {
                let _ = writeln!(out, "{:<22} {:>6}", f.timestamp, "n/a");
            }
        }
    }
    match data.peak() {
        Some((peak, value)) => {
            let _ = write!(out, "Peak: {value} W/m² at {}", peak.timestamp);
        }
        None => out.push_str("Peak: n/a"),
    }
    out
}

pub fn render_daily(data: &DailyForecastData) -> String {
    if data.is_empty() {
        return "No daily forecast available.".to_string();
    }

    let mut out = String::new();
    for f in data {
        match f.total_irradiance {
            Some(total) => {
                let _ = writeln!(out, "{:<22} {:>6} Wh/m²", f.timestamp, total);
            }
            None => {
                let _ = writeln!(out, "{:<22} {:>6}", f.timestamp, "n/a");
            }
        }
    }
    match data.total() {
        Some(total) => {
            let _ = write!(out, "Total: {total} Wh/m²");
        }
        None => out.push_str("Total: n/a"),
    }
    out
}
