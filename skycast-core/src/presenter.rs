use crate::error::WeatherError;
use crate::model::{ForecastEntry, UnitSystem, WeatherReading};

/// Display slots a screen is expected to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Location,
    Description,
    Temperature,
    FeelsLike,
    Humidity,
    Wind,
    Pressure,
    Visibility,
    Icon,
}

impl Field {
    pub const fn all() -> &'static [Field] {
        &[
            Field::Location,
            Field::Description,
            Field::Temperature,
            Field::FeelsLike,
            Field::Humidity,
            Field::Wind,
            Field::Pressure,
            Field::Visibility,
            Field::Icon,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Location => "location",
            Field::Description => "description",
            Field::Temperature => "temperature",
            Field::FeelsLike => "feels_like",
            Field::Humidity => "humidity",
            Field::Wind => "wind",
            Field::Pressure => "pressure",
            Field::Visibility => "visibility",
            Field::Icon => "icon",
        }
    }
}

/// Render surface for the widget. Implementations range from the
/// terminal panel in the CLI to recording fakes in tests.
pub trait Screen {
    /// Whether this screen provides the given display slot.
    fn has_slot(&self, field: Field) -> bool;

    /// Write one display value. Only called for slots that exist.
    fn put(&mut self, field: Field, value: String);

    /// Make the populated result visible.
    fn show_card(&mut self);

    /// Hide any prior result.
    fn hide_card(&mut self);

    /// Loading indicator on/off; also disables input while on.
    fn set_busy(&mut self, busy: bool);

    /// Surface a user-visible message.
    fn show_message(&mut self, text: &str);

    fn clear_message(&mut self);

    /// Best-effort forecast strip; entries are already daily samples.
    fn show_forecast(&mut self, days: &[ForecastEntry]);
}

pub fn rounded_degrees(value: f64) -> i64 {
    value.round() as i64
}

/// Metric wind display is km/h converted from the provider's m/s.
pub fn wind_kmh(mps: f64) -> i64 {
    (mps * 3.6).round() as i64
}

fn temperature_suffix(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "°C",
        UnitSystem::Imperial => "°F",
        UnitSystem::Standard => "K",
    }
}

fn wind_display(units: UnitSystem, speed: f64) -> String {
    match units {
        // metric and standard responses carry m/s
        UnitSystem::Metric | UnitSystem::Standard => format!("{} km/h", wind_kmh(speed)),
        UnitSystem::Imperial => format!("{} mph", speed.round() as i64),
    }
}

/// Map a reading onto display values.
pub fn render(reading: &WeatherReading, units: UnitSystem) -> Vec<(Field, String)> {
    let suffix = temperature_suffix(units);
    vec![
        (Field::Location, format!("{}, {}", reading.place, reading.country)),
        (Field::Description, reading.description.clone()),
        (Field::Temperature, format!("{}{suffix}", rounded_degrees(reading.temperature))),
        (Field::FeelsLike, format!("{}{suffix}", rounded_degrees(reading.feels_like))),
        (Field::Humidity, format!("{}%", reading.humidity_pct)),
        (Field::Wind, wind_display(units, reading.wind_speed_mps)),
        (Field::Pressure, format!("{} hPa", reading.pressure_hpa)),
        (Field::Visibility, format!("{:.1} km", f64::from(reading.visibility_m) / 1000.0)),
        (Field::Icon, reading.icon.clone()),
    ]
}

/// Populate every display slot, atomically: if any expected slot is
/// missing the whole update is aborted and nothing is written.
pub fn present<S: Screen + ?Sized>(
    screen: &mut S,
    reading: &WeatherReading,
    units: UnitSystem,
) -> Result<(), WeatherError> {
    let values = render(reading, units);

    for (field, _) in &values {
        if !screen.has_slot(*field) {
            return Err(WeatherError::Display(field.name()));
        }
    }

    for (field, value) in values {
        screen.put(field, value);
    }
    screen.show_card();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeScreen {
        missing: Option<Field>,
        values: HashMap<Field, String>,
        puts: usize,
        card_shown: bool,
    }

    impl FakeScreen {
        fn new() -> Self {
            Self { missing: None, values: HashMap::new(), puts: 0, card_shown: false }
        }

        fn without(field: Field) -> Self {
            Self { missing: Some(field), ..Self::new() }
        }
    }

    impl Screen for FakeScreen {
        fn has_slot(&self, field: Field) -> bool {
            self.missing != Some(field)
        }

        fn put(&mut self, field: Field, value: String) {
            self.puts += 1;
            self.values.insert(field, value);
        }

        fn show_card(&mut self) {
            self.card_shown = true;
        }

        fn hide_card(&mut self) {
            self.card_shown = false;
        }

        fn set_busy(&mut self, _busy: bool) {}
        fn show_message(&mut self, _text: &str) {}
        fn clear_message(&mut self) {}
        fn show_forecast(&mut self, _days: &[ForecastEntry]) {}
    }

    fn paris() -> WeatherReading {
        WeatherReading {
            place: "Paris".to_string(),
            country: "FR".to_string(),
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
            temperature: 18.4,
            feels_like: 17.9,
            humidity_pct: 60,
            pressure_hpa: 1012,
            wind_speed_mps: 3.0,
            visibility_m: 10_000,
        }
    }

    #[test]
    fn metric_formatting() {
        let values: HashMap<_, _> = render(&paris(), UnitSystem::Metric).into_iter().collect();

        assert_eq!(values[&Field::Location], "Paris, FR");
        assert_eq!(values[&Field::Temperature], "18°C");
        assert_eq!(values[&Field::FeelsLike], "18°C");
        assert_eq!(values[&Field::Humidity], "60%");
        assert_eq!(values[&Field::Wind], "11 km/h");
        assert_eq!(values[&Field::Pressure], "1012 hPa");
        assert_eq!(values[&Field::Visibility], "10.0 km");
    }

    #[test]
    fn wind_conversion_rounds() {
        assert_eq!(wind_kmh(3.0), 11); // 10.8
        assert_eq!(wind_kmh(5.0), 18);
        assert_eq!(wind_kmh(0.0), 0);
    }

    #[test]
    fn present_fills_every_slot_once() {
        let mut screen = FakeScreen::new();
        present(&mut screen, &paris(), UnitSystem::Metric).expect("all slots available");

        assert_eq!(screen.puts, Field::all().len());
        assert!(screen.card_shown);
        assert_eq!(screen.values[&Field::Location], "Paris, FR");
    }

    #[test]
    fn missing_slot_aborts_whole_update() {
        let mut screen = FakeScreen::without(Field::Pressure);
        let err = present(&mut screen, &paris(), UnitSystem::Metric).unwrap_err();

        assert!(matches!(err, WeatherError::Display("pressure")));
        assert_eq!(screen.puts, 0);
        assert!(!screen.card_shown);
    }
}
