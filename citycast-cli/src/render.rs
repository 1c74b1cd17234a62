use chrono::Local;
use citycast_core::{Units, WeatherState};

fn unit_label(units: Units) -> &'static str {
    match units {
        Units::Metric => "°C",
        Units::Imperial => "°F",
        Units::Standard => "K",
    }
}

/// Human-readable block for a state holding weather.
pub fn format_weather(state: &WeatherState, units: Units) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", state.city_name));
    out.push_str(&format!("  Temperature: {} ({})\n", state.temperature, unit_label(units)));
    out.push_str(&format!("  Max / Min:   {}\n", state.temperature_min_max));
    out.push_str(&format!("  Feels like:  {}\n", state.feels_like));
    out.push_str(&format!("  Humidity:    {}\n", state.humidity));
    if !state.weather_description.is_empty() {
        out.push_str(&format!("  Conditions:  {}\n", state.weather_description));
    }
    if let Some(url) = &state.weather_icon_url {
        out.push_str(&format!("  Icon:        {url}\n"));
    }
    if let Some(at) = state.last_updated {
        let local = at.with_timezone(&Local);
        out.push_str(&format!("  Updated:     {}\n", local.format("%Y-%m-%d %H:%M")));
    }

    out
}

pub fn print_weather(state: &WeatherState, units: Units) -> anyhow::Result<()> {
    if let Some(message) = &state.error_message {
        anyhow::bail!("{message} for {}", state.city_name);
    }

    print!("{}", format_weather(state, units));
    Ok(())
}
