use std::collections::HashMap;
use std::fmt::Write as _;

use skycast_core::{Field, ForecastEntry, Screen};

/// Terminal implementation of the widget screen: display slots are
/// collected while the session runs and rendered as one panel at the
/// end. Progress goes to stderr so the panel stays clean on stdout.
pub struct TermScreen {
    values: HashMap<Field, String>,
    forecast: Vec<ForecastEntry>,
    message: Option<String>,
    card_visible: bool,
}

impl TermScreen {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            forecast: Vec::new(),
            message: None,
            card_visible: false,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn value(&self, field: Field) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    /// Human-readable panel for the collected result.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.card_visible {
            let _ = writeln!(out, "{}", self.value(Field::Location));
            let _ = writeln!(
                out,
                "{} [{}]",
                self.value(Field::Description),
                self.value(Field::Icon)
            );
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "  Temperature  {} (feels like {})",
                self.value(Field::Temperature),
                self.value(Field::FeelsLike)
            );
            let _ = writeln!(out, "  Humidity     {}", self.value(Field::Humidity));
            let _ = writeln!(out, "  Wind         {}", self.value(Field::Wind));
            let _ = writeln!(out, "  Pressure     {}", self.value(Field::Pressure));
            let _ = writeln!(out, "  Visibility   {}", self.value(Field::Visibility));
        }

        if !self.forecast.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Forecast:");
            for day in &self.forecast {
                let _ = writeln!(
                    out,
                    "  {}  {:>4}  {} [{}]",
                    day.timestamp.format("%a %d %b %H:%M"),
                    format!("{}°", day.temperature.round()),
                    day.description,
                    day.icon
                );
            }
        }

        out
    }
}

impl Default for TermScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for TermScreen {
    fn has_slot(&self, _field: Field) -> bool {
        true
    }

    fn put(&mut self, field: Field, value: String) {
        self.values.insert(field, value);
    }

    fn show_card(&mut self) {
        self.card_visible = true;
    }

    fn hide_card(&mut self) {
        self.card_visible = false;
        self.values.clear();
        self.forecast.clear();
    }

    fn set_busy(&mut self, busy: bool) {
        if busy {
            eprintln!("Fetching weather...");
        }
    }

    fn show_message(&mut self, text: &str) {
        self.message = Some(text.to_string());
    }

    fn clear_message(&mut self) {
        self.message = None;
    }

    fn show_forecast(&mut self, days: &[ForecastEntry]) {
        self.forecast = days.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_populated_fields() {
        let mut screen = TermScreen::new();
        screen.put(Field::Location, "Paris, FR".to_string());
        screen.put(Field::Description, "clear sky".to_string());
        screen.put(Field::Icon, "01d".to_string());
        screen.put(Field::Temperature, "18°C".to_string());
        screen.put(Field::FeelsLike, "18°C".to_string());
        screen.put(Field::Humidity, "60%".to_string());
        screen.put(Field::Wind, "11 km/h".to_string());
        screen.put(Field::Pressure, "1012 hPa".to_string());
        screen.put(Field::Visibility, "10.0 km".to_string());
        screen.show_card();

        let panel = screen.render();
        assert!(panel.contains("Paris, FR"));
        assert!(panel.contains("18°C"));
        assert!(panel.contains("11 km/h"));
    }

    #[test]
    fn hidden_card_renders_nothing() {
        let mut screen = TermScreen::new();
        screen.put(Field::Location, "Paris, FR".to_string());
        screen.hide_card();

        assert!(screen.render().is_empty());
    }
}
