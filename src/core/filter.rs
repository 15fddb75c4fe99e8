use super::trip::{Trip, TripStatus};

/// Named selectors backing the trip list tabs. The predicates overlap on purpose:
/// a shared trip can also be a draft, a completed trip can also be archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripFilter {
    All,
    Upcoming,
    Drafts,
    Archived,
    Shared,
    Completed,
}

impl TripFilter {
    pub const ALL: [TripFilter; 6] = [
        Self::All,
        Self::Upcoming,
        Self::Drafts,
        Self::Archived,
        Self::Shared,
        Self::Completed,
    ];

    pub fn matches(&self, trip: &Trip) -> bool {
        match self {
            Self::All => !trip.is_archived,
            Self::Upcoming => {
                trip.status == TripStatus::Upcoming && !trip.is_archived && !trip.is_draft
            }
            Self::Drafts => trip.is_draft && !trip.is_archived,
            Self::Archived => trip.is_archived,
            Self::Shared => trip.is_shared,
            Self::Completed => trip.status == TripStatus::Completed,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Upcoming => "Upcoming Trips",
            Self::Drafts => "Drafted Trips",
            Self::Archived => "Archived Trips",
            Self::Shared => "Shared Trips",
            Self::Completed => "Past Trips",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Upcoming => "upcoming",
            Self::Drafts => "drafts",
            Self::Archived => "archived",
            Self::Shared => "shared",
            Self::Completed => "completed",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(Self::All),
            "upcoming" => Some(Self::Upcoming),
            "drafts" | "drafted" => Some(Self::Drafts),
            "archived" => Some(Self::Archived),
            "shared" => Some(Self::Shared),
            "completed" | "past" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// The trips a list surface shows: selector first, then the search query.
/// Collection order is preserved.
pub fn filter_trips<'a>(trips: &'a [Trip], filter: TripFilter, query: &str) -> Vec<&'a Trip> {
    trips
        .iter()
        .filter(|t| filter.matches(t))
        .filter(|t| t.matches_query(query))
        .collect()
}
