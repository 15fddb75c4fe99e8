use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub min: f64,
    pub max: f64,
    pub morning: Option<f64>,
    pub afternoon: Option<f64>,
    pub evening: Option<f64>,
    pub overnight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precipitation {
    pub probability: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub direction: f64,
}

/// One day of a trip forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: String,
    pub temperature: Temperature,
    pub condition: String,
    pub precipitation: Precipitation,
    pub humidity: f64,
    pub wind: Wind,
    pub sunrise: String,
    pub sunset: String,
}

impl DayForecast {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(&self.condition)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub location: ForecastLocation,
    pub days: Vec<DayForecast>,
    pub note: Option<String>,
}

/// Point forecast for a single activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityWeather {
    pub temperature: Option<f64>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub condition: Option<String>,
    pub precipitation_probability: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<String>,
    pub cloud_cover: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub forecast_timestamp: Option<String>,
}

impl ActivityWeather {
    pub fn condition(&self) -> Option<WeatherCondition> {
        self.condition.as_deref().map(WeatherCondition::from_code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvCategory {
    Low,
    Moderate,
    High,
}

impl UvCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

/// Condition codes emitted by the weather backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    MostlyCloudy,
    Fog,
    Rain,
    Drizzle,
    Snow,
    Sleet,
    Thunderstorms,
    SunShowers,
    SunFlurries,
    Other(String),
}

impl WeatherCondition {
    pub fn from_code(code: &str) -> Self {
        match code {
            "clear" => Self::Clear,
            "partlyCloudy" => Self::PartlyCloudy,
            "cloudy" => Self::Cloudy,
            "mostlyCloudy" => Self::MostlyCloudy,
            "fog" => Self::Fog,
            "rain" => Self::Rain,
            "drizzle" => Self::Drizzle,
            "snow" => Self::Snow,
            "sleet" => Self::Sleet,
            "thunderstorms" => Self::Thunderstorms,
            "sunShowers" => Self::SunShowers,
            "sunFlurries" => Self::SunFlurries,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun.max.fill",
            Self::PartlyCloudy => "cloud.sun.fill",
            Self::Cloudy => "cloud.fill",
            Self::MostlyCloudy => "smoke.fill",
            Self::Fog => "cloud.fog.fill",
            Self::Rain => "cloud.rain.fill",
            Self::Drizzle => "cloud.drizzle.fill",
            Self::Snow => "cloud.snow.fill",
            Self::Sleet => "cloud.sleet.fill",
            Self::Thunderstorms => "cloud.bolt.rain.fill",
            Self::SunShowers => "cloud.sun.rain.fill",
            Self::SunFlurries => "cloud.sun.snow.fill",
            Self::Other(_) => "cloud.fill",
        }
    }

    pub fn display_name(&self) -> String {
        let name = match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::MostlyCloudy => "Mostly Cloudy",
            Self::Fog => "Foggy",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorms => "Thunderstorms",
            Self::SunShowers => "Sun Showers",
            Self::SunFlurries => "Sun Flurries",
            Self::Other(code) => return capitalize_words(code),
        };
        name.to_string()
    }

    pub fn uv_category(&self) -> UvCategory {
        match self {
            Self::Clear => UvCategory::High,
            Self::PartlyCloudy => UvCategory::Moderate,
            _ => UvCategory::Low,
        }
    }
}

/// Icon for an optional condition; a missing condition shows a plain cloud.
pub fn icon_for(condition: Option<&str>) -> &'static str {
    condition
        .map(|c| WeatherCondition::from_code(c).icon_name())
        .unwrap_or("cloud.fill")
}

/// Uppercase the first letter of every alphanumeric run and lowercase the
/// rest, keeping separators as they are.
fn capitalize_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}
