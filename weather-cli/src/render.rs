//! Plain-text rendering of API payloads.

use std::fmt::Write;

use weather_core::{
    CurrentConditions, ForecastPayload, GeocodingResult, TemperatureUnit,
    display::{condition_label, format_date, format_weekday, wind_direction},
};

pub fn current(c: &CurrentConditions, unit: TemperatureUnit) -> String {
    let mut out = String::new();

    let place = match c.sys.country.as_deref() {
        Some(country) => format!("{}, {}", c.name, country),
        None => c.name.clone(),
    };
    let _ = writeln!(out, "{place}");
    let _ = writeln!(out, "{}", format_date(c.dt));

    let (icon, description) = c
        .primary_condition()
        .map(|w| (w.icon.as_str(), w.description.as_str()))
        .unwrap_or(("", "Unknown"));
    let _ = writeln!(
        out,
        "{}  {} ({})",
        unit.format(c.main.temp),
        description,
        condition_label(icon)
    );

    if let Some(wind) = &c.wind {
        match wind.deg {
            Some(deg) => {
                let _ = writeln!(out, "Wind: {:.1} m/s {}", wind.speed, wind_direction(deg));
            }
            None => {
                let _ = writeln!(out, "Wind: {:.1} m/s", wind.speed);
            }
        }
    }
    if let Some(humidity) = c.main.humidity {
        let _ = writeln!(out, "Humidity: {humidity}%");
    }

    out.trim_end().to_string()
}

pub fn forecast(payload: &ForecastPayload, unit: TemperatureUnit) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Forecast for {}", payload.city.name);

    for day in &payload.forecast {
        let low = day.main.temp_min.unwrap_or(day.main.temp);
        let high = day.main.temp_max.unwrap_or(day.main.temp);
        let icon = day.primary_condition().map(|w| w.icon.as_str()).unwrap_or("");
        let _ = writeln!(
            out,
            "  {:<4} {}-{}  {}",
            format_weekday(day.dt),
            unit.from_celsius(low).round(),
            unit.format(high),
            condition_label(icon)
        );
    }

    out.trim_end().to_string()
}

pub fn locations(results: &[GeocodingResult]) -> String {
    if results.is_empty() {
        return "No locations found".to_string();
    }

    results
        .iter()
        .map(|r| format!("{}  ({:.2}, {:.2})", r.display_name(), r.lat, r.lon))
        .collect::<Vec<_>>()
        .join("\n")
}
