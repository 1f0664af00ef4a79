//! Presentation: turns a [`WeatherReading`] into the strings shown on the card.

use std::fmt;

use crate::{config::DEFAULT_ICON_BASE_URL, model::WeatherReading};

/// Build the provider-hosted icon URL for an icon code.
pub fn icon_url(base: &str, icon: &str) -> String {
    format!("{}/{icon}@2x.png", base.trim_end_matches('/'))
}

/// Display regions of the widget. Hidden until the first render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherPanel {
    icon_base_url: String,
    pub location: String,
    pub temperature: String,
    pub description: String,
    pub humidity: String,
    pub wind_speed: String,
    pub icon_url: String,
    pub visible: bool,
}

impl WeatherPanel {
    pub fn new(icon_base_url: impl Into<String>) -> Self {
        Self {
            icon_base_url: icon_base_url.into(),
            ..Self::default()
        }
    }

    /// Overwrite every region with `reading` and show the card.
    pub fn render(&mut self, reading: &WeatherReading) {
        self.location = format!("{}, {}", reading.location, reading.country);
        self.temperature = format!("Temperature: {} °C", reading.temperature_c);
        self.description = format!("Weather: {}", reading.condition);
        self.humidity = format!("Humidity: {}%", reading.humidity_pct);
        self.wind_speed = format!("Wind Speed: {} m/s", reading.wind_speed_mps);

        let base = if self.icon_base_url.is_empty() {
            DEFAULT_ICON_BASE_URL
        } else {
            self.icon_base_url.as_str()
        };
        self.icon_url = icon_url(base, &reading.icon);

        self.visible = true;
    }
}

impl fmt::Display for WeatherPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.visible {
            return Ok(());
        }
        writeln!(f, "{}", self.location)?;
        writeln!(f, "  {}", self.temperature)?;
        writeln!(f, "  {}", self.description)?;
        writeln!(f, "  {}", self.humidity)?;
        writeln!(f, "  {}", self.wind_speed)?;
        write!(f, "  Icon: {}", self.icon_url)
    }
}
