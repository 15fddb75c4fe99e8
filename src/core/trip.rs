use chrono::{Days, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Upcoming,
    Active,
    Completed,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A single scheduled itinerary item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
}

impl Activity {
    pub fn new(title: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            date,
            notes: String::new(),
            location: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    pub status: TripStatus,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Trip {
    pub fn new(
        title: impl Into<String>,
        destination: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            destination: destination.into(),
            start_date,
            end_date,
            notes: String::new(),
            status: TripStatus::Upcoming,
            is_archived: false,
            is_draft: false,
            is_shared: false,
            activities: Vec::new(),
        }
    }

    /// A trip saved before the user finished filling it in.
    pub fn draft(
        title: impl Into<String>,
        destination: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            is_draft: true,
            ..Self::new(title, destination, start_date, end_date)
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end_date - self.start_date
    }

    pub fn has_valid_dates(&self) -> bool {
        self.end_date >= self.start_date
    }

    /// Shift both dates by `days`, keeping the duration. Returns false and leaves
    /// the trip untouched if either date would leave the calendar range.
    pub fn shift_dates(&mut self, days: i64) -> bool {
        let shift = |date: NaiveDate| {
            if days >= 0 {
                date.checked_add_days(Days::new(days.unsigned_abs()))
            } else {
                date.checked_sub_days(Days::new(days.unsigned_abs()))
            }
        };
        match (shift(self.start_date), shift(self.end_date)) {
            (Some(start), Some(end)) => {
                self.start_date = start;
                self.end_date = end;
                true
            }
            _ => false,
        }
    }

    /// Activities in display order (by date, ties keep insertion order).
    pub fn sorted_activities(&self) -> Vec<&Activity> {
        let mut sorted: Vec<&Activity> = self.activities.iter().collect();
        sorted.sort_by_key(|a| a.date);
        sorted
    }

    pub fn activity(&self, id: Uuid) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// First activity location, the trip's best guess at a map position.
    pub fn first_location(&self) -> Option<Coordinate> {
        self.sorted_activities()
            .into_iter()
            .find_map(|a| a.location)
    }

    /// Case-insensitive substring match on title or destination.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.destination.to_lowercase().contains(&needle)
    }
}
