use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Failure to write a slot of the key-value store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no trip with id {0}")]
    NotFound(Uuid),
    #[error("trip {trip} has no activity with id {activity}")]
    ActivityNotFound { trip: Uuid, activity: Uuid },
    #[error("id {0} is already in use")]
    DuplicateId(Uuid),
    #[error("trip ends ({end}) before it starts ({start})")]
    InvalidDates { start: NaiveDate, end: NaiveDate },
    #[error("shifted date falls outside the supported calendar range")]
    DateOutOfRange,
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("no internet connection")]
    NoConnection,
    #[error("request timed out")]
    Timeout,
    #[error("weather service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode weather response: {0}")]
    Decode(String),
    #[error("invalid weather url: {0}")]
    InvalidUrl(String),
    #[error("request cancelled")]
    Cancelled,
    #[error(transparent)]
    Http(reqwest::Error),
}

impl WeatherError {
    /// Sort a transport error into the connectivity/timeout/other buckets the UI distinguishes.
    pub fn classify(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::NoConnection
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err)
        }
    }

    /// The message shown in place of the forecast.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoConnection => {
                "No internet connection. Please check your network settings.".to_string()
            }
            Self::Timeout => "Request timed out. Please try again.".to_string(),
            Self::Http(e) => format!("Network error: {}", e),
            other => format!("Error fetching weather data: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_messages() {
        assert_eq!(
            WeatherError::NoConnection.user_message(),
            "No internet connection. Please check your network settings."
        );
        assert_eq!(
            WeatherError::Timeout.user_message(),
            "Request timed out. Please try again."
        );
    }

    #[test]
    fn other_failures_fall_back_to_generic_message() {
        let err = WeatherError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(
            err.user_message(),
            "Error fetching weather data: weather service returned 500: boom"
        );
    }

    #[test]
    fn invalid_dates_display() {
        let err = StoreError::InvalidDates {
            start: NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "trip ends (2025-06-01) before it starts (2025-06-07)"
        );
    }
}
