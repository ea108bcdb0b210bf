//! Weather observations and atmospheric stability classification.
//!
//! One observation stands for an entire candidate time slot: the caller
//! supplies daily rows (optionally refined with hourly rows) and the
//! [`WeatherTable`] resolves the most specific row for a slot. Missing
//! dates are the caller's problem to default — the core never fetches.

use crate::core_types::units::{Degrees, MetersPerSecond, Percent};
use crate::error::CoreError;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Pasquill-Gifford atmospheric stability categories.
///
/// Controls how quickly a plume spreads: A (very unstable, vigorous
/// mixing) through F (very stable, suppressed mixing). The dispersion
/// coefficient rows keyed by this enum live in
/// [`crate::physics::dispersion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StabilityClass {
    /// A: Very unstable (strong solar heating, light winds)
    A,
    /// B: Moderately unstable
    B,
    /// C: Slightly unstable
    C,
    /// D: Neutral (overcast or high winds)
    D,
    /// E: Slightly stable
    E,
    /// F: Very stable (clear night, light winds)
    F,
}

/// Daytime insolation / nighttime sky condition, the second axis of the
/// Pasquill stability lookup for feeds that lack an explicit class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Insolation {
    /// Strong daytime solar heating (clear summer midday).
    StrongDay,
    /// Moderate daytime heating.
    ModerateDay,
    /// Slight daytime heating (low sun or broken cloud).
    SlightDay,
    /// Night with >= 4/8 cloud cover.
    OvercastNight,
    /// Night with clear or nearly clear sky.
    ClearNight,
}

impl StabilityClass {
    /// All six classes, least to most stable.
    pub const ALL: [StabilityClass; 6] = [
        StabilityClass::A,
        StabilityClass::B,
        StabilityClass::C,
        StabilityClass::D,
        StabilityClass::E,
        StabilityClass::F,
    ];

    /// Parse the single-letter code used by weather feeds.
    ///
    /// # Errors
    /// `CoreError::InvalidStabilityClass` for anything outside A-F;
    /// never silently defaults.
    pub fn from_letter(letter: &str) -> Result<Self, CoreError> {
        match letter.trim() {
            "A" | "a" => Ok(StabilityClass::A),
            "B" | "b" => Ok(StabilityClass::B),
            "C" | "c" => Ok(StabilityClass::C),
            "D" | "d" => Ok(StabilityClass::D),
            "E" | "e" => Ok(StabilityClass::E),
            "F" | "f" => Ok(StabilityClass::F),
            other => Err(CoreError::InvalidStabilityClass(other.to_string())),
        }
    }

    /// Letter code for display and logs.
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            StabilityClass::A => 'A',
            StabilityClass::B => 'B',
            StabilityClass::C => 'C',
            StabilityClass::D => 'D',
            StabilityClass::E => 'E',
            StabilityClass::F => 'F',
        }
    }

    /// Derive a class from surface wind and insolation using the classic
    /// Pasquill table (Turner 1970 workbook rendition). Split cells
    /// (A-B etc.) resolve toward the more stable member so derived
    /// classes never overstate dispersion.
    #[must_use]
    pub fn derive(wind_speed: MetersPerSecond, insolation: Insolation) -> Self {
        use Insolation::{ClearNight, ModerateDay, OvercastNight, SlightDay, StrongDay};
        let u = *wind_speed;
        match insolation {
            StrongDay => {
                if u < 2.0 {
                    StabilityClass::A
                } else if u < 5.0 {
                    StabilityClass::B
                } else {
                    StabilityClass::C
                }
            }
            ModerateDay => {
                if u < 2.0 {
                    StabilityClass::B
                } else if u < 5.0 {
                    StabilityClass::C
                } else {
                    StabilityClass::D
                }
            }
            SlightDay => {
                if u < 2.0 {
                    StabilityClass::B
                } else if u < 3.0 {
                    StabilityClass::C
                } else {
                    StabilityClass::D
                }
            }
            OvercastNight => {
                if u < 3.0 {
                    StabilityClass::E
                } else {
                    StabilityClass::D
                }
            }
            ClearNight => {
                if u < 3.0 {
                    StabilityClass::F
                } else if u < 5.0 {
                    StabilityClass::E
                } else {
                    StabilityClass::D
                }
            }
        }
    }
}

impl std::fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// One weather record, representative of a whole slot unless an hourly
/// refinement exists for the same date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Date this record covers.
    pub date: NaiveDate,
    /// Hour of day (0-23) when this is an hourly refinement; `None` for
    /// a daily representative record.
    pub hour: Option<u32>,
    /// Surface wind speed.
    pub wind_speed: MetersPerSecond,
    /// Direction the wind blows FROM (meteorological convention).
    pub wind_direction: Degrees,
    /// Air temperature (°C).
    pub temperature_c: f64,
    /// Relative humidity.
    pub relative_humidity: Percent,
    /// Pasquill-Gifford stability class.
    pub stability: StabilityClass,
}

impl WeatherObservation {
    /// Daily representative record.
    #[must_use]
    pub fn daily(
        date: NaiveDate,
        wind_speed: MetersPerSecond,
        wind_direction: Degrees,
        stability: StabilityClass,
    ) -> Self {
        Self {
            date,
            hour: None,
            wind_speed,
            wind_direction,
            temperature_c: 20.0,
            relative_humidity: Percent::new(40.0),
            stability,
        }
    }

    /// Hourly refinement of a daily record.
    #[must_use]
    pub fn at_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour.min(23));
        self
    }
}

/// Lookup over the caller-supplied observations for one planning run.
///
/// Resolution order for a slot at (date, hour): exact hourly row, then
/// the date's daily row. `None` means the caller failed to provide even
/// a default for that date, which the optimizer reports as
/// [`CoreError::MissingWeather`] before any annealing starts.
#[derive(Debug, Clone)]
pub struct WeatherTable<'a> {
    observations: &'a [WeatherObservation],
    hourly: FxHashMap<(NaiveDate, u32), usize>,
    daily: FxHashMap<NaiveDate, usize>,
}

impl<'a> WeatherTable<'a> {
    /// Index a slice of observations. Later rows win on key collisions,
    /// matching "most recently issued forecast wins" caller semantics.
    #[must_use]
    pub fn new(observations: &'a [WeatherObservation]) -> Self {
        let mut hourly = FxHashMap::default();
        let mut daily = FxHashMap::default();
        for (idx, obs) in observations.iter().enumerate() {
            match obs.hour {
                Some(hour) => {
                    hourly.insert((obs.date, hour), idx);
                }
                None => {
                    daily.insert(obs.date, idx);
                }
            }
        }
        Self {
            observations,
            hourly,
            daily,
        }
    }

    /// Index of the observation covering (date, hour), if any.
    #[must_use]
    pub fn resolve(&self, date: NaiveDate, hour: u32) -> Option<usize> {
        self.hourly
            .get(&(date, hour))
            .or_else(|| self.daily.get(&date))
            .copied()
    }

    /// The observation covering (date, hour), if any.
    #[must_use]
    pub fn observation_for(&self, date: NaiveDate, hour: u32) -> Option<&'a WeatherObservation> {
        self.resolve(date, hour).map(|idx| &self.observations[idx])
    }

    /// Observation by resolved index.
    #[must_use]
    pub fn get(&self, idx: usize) -> &'a WeatherObservation {
        &self.observations[idx]
    }
}
