//! Pure filtering, ordering and formatting of bookings for display.
//!
//! Rows carry raw text; the HTML templates escape every field on output.

use crate::types::{Booking, BookingId};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub const NO_BOOKINGS_MESSAGE: &str = "No bookings found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    Today,
    Tomorrow,
    Upcoming,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::Today, Filter::Tomorrow, Filter::Upcoming];

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::Today => "today",
            Filter::Tomorrow => "tomorrow",
            Filter::Upcoming => "upcoming",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Filter::Today => "Today",
            Filter::Tomorrow => "Tomorrow",
            Filter::Upcoming => "Upcoming",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Filter::Today => "Today's Bookings",
            Filter::Tomorrow => "Tomorrow's Bookings",
            Filter::Upcoming => "All Upcoming Bookings",
        }
    }

    /// Upcoming includes all of today regardless of the time of day.
    pub fn matches(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Filter::Today => date == today,
            Filter::Tomorrow => today.checked_add_days(Days::new(1)) == Some(date),
            Filter::Upcoming => date >= today,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRow {
    pub id: BookingId,
    pub staff_name: String,
    pub resource: String,
    pub date: String,
    pub time_range: String,
}

impl From<&Booking> for BookingRow {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            staff_name: booking.staff_name.clone(),
            resource: booking.resource.clone(),
            date: format_date(booking.date),
            time_range: format!(
                "{} - {}",
                booking.start_time.format("%H:%M"),
                booking.end_time.format("%H:%M")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayRow {
    Booking(BookingRow),
    Empty { message: String },
}

impl DisplayRow {
    pub fn booking(&self) -> Option<&BookingRow> {
        match self {
            DisplayRow::Booking(row) => Some(row),
            DisplayRow::Empty { .. } => None,
        }
    }

    pub fn placeholder(&self) -> &str {
        match self {
            DisplayRow::Booking(_) => "",
            DisplayRow::Empty { message } => message,
        }
    }
}

/// Bookings matching `filter`, ordered by date then start time.
pub fn filter_bookings(filter: Filter, bookings: &[Booking], today: NaiveDate) -> Vec<Booking> {
    let mut filtered: Vec<Booking> = bookings
        .iter()
        .filter(|booking| filter.matches(booking.date, today))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));
    filtered
}

pub fn render(filter: Filter, bookings: &[Booking], today: NaiveDate) -> Vec<DisplayRow> {
    let filtered = filter_bookings(filter, bookings, today);
    if filtered.is_empty() {
        return vec![DisplayRow::Empty {
            message: NO_BOOKINGS_MESSAGE.into(),
        }];
    }
    filtered
        .iter()
        .map(|booking| DisplayRow::Booking(booking.into()))
        .collect()
}

/// Day/month/year order for people reading the list.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
