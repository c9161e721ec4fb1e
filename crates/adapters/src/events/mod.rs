//! Event source adapters

mod calendarific;

pub use calendarific::{CalendarificEventSource, REQUEST_TIMEOUT};
