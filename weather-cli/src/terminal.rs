use chrono::Local;
use weather_widget_core::{
    WeatherPanel, WeatherReading,
    ui::{Modal, Notifier},
};

/// Alerts go to stderr so stdout only carries the weather card.
#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&mut self, message: &str) {
        eprintln!("! {message}");
    }
}

/// Start-up help text; stays up until the first successful fetch.
#[derive(Debug, Default)]
pub struct InfoBanner {
    visible: bool,
}

impl InfoBanner {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Modal for InfoBanner {
    fn show(&mut self) {
        self.visible = true;
        eprintln!("Weather widget");
        eprintln!("  Enter your OpenWeather API key, then look up a city or use your location.");
        eprintln!("  Get a free key at https://home.openweathermap.org/api_keys");
        eprintln!();
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

pub fn print_card(panel: &WeatherPanel, reading: Option<&WeatherReading>) {
    println!("{panel}");
    if let Some(reading) = reading {
        let local = reading.observed_at.with_timezone(&Local);
        println!("  Updated: {}", local.format("%Y-%m-%d %H:%M"));
    }
}

pub fn print_json(reading: &WeatherReading) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(reading)?);
    Ok(())
}
