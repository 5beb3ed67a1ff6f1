// Query keys, one constructor per cached read
//
// The first part is the resource name; mutations invalidate by that prefix.

use crate::cache::QueryKey;
use crate::models::{DateRange, MovieStatus, Pagination, RecordId, StatisticKind};

pub fn cinemas() -> QueryKey {
    QueryKey::new("cinemas")
}

pub fn cinema(id: Option<&RecordId>) -> QueryKey {
    QueryKey::new("cinema").with_optional(id)
}

pub fn screens() -> QueryKey {
    QueryKey::new("screens")
}

pub fn screens_by_cinema(cinema_id: Option<&RecordId>) -> QueryKey {
    screens().with_optional(cinema_id)
}

pub fn rooms() -> QueryKey {
    QueryKey::new("rooms")
}

pub fn rooms_by_cinema(cinema_id: Option<&RecordId>) -> QueryKey {
    rooms().with_optional(cinema_id)
}

pub fn room(id: Option<&RecordId>) -> QueryKey {
    QueryKey::new("room").with_optional(id)
}

pub fn seats() -> QueryKey {
    QueryKey::new("seats")
}

pub fn seats_by_room(room_id: Option<&RecordId>) -> QueryKey {
    seats().with_optional(room_id)
}

pub fn combos() -> QueryKey {
    QueryKey::new("combos")
}

pub fn combo(id: Option<&RecordId>) -> QueryKey {
    QueryKey::new("combo").with_optional(id)
}

pub fn discounts() -> QueryKey {
    QueryKey::new("discounts")
}

pub fn discount(id: Option<&RecordId>) -> QueryKey {
    QueryKey::new("discount").with_optional(id)
}

pub fn genres() -> QueryKey {
    QueryKey::new("genres")
}

pub fn movies(status: MovieStatus) -> QueryKey {
    QueryKey::new("movies").with(status.as_str())
}

pub fn payments() -> QueryKey {
    QueryKey::new("payments")
}

pub fn payments_by_cinema(cinema_id: Option<&RecordId>, range: Option<&DateRange>) -> QueryKey {
    payments()
        .with_optional(cinema_id)
        .with_optional(range.map(|r| r.start_date))
        .with_optional(range.map(|r| r.end_date))
}

// All payments, as shown in the invoices table
pub fn invoices() -> QueryKey {
    QueryKey::new("invoices")
}

pub fn invoices_page(pagination: Pagination) -> QueryKey {
    invoices().with(pagination.page).with(pagination.limit)
}

pub fn statistics() -> QueryKey {
    QueryKey::new("statistics")
}

pub fn statistics_for(kind: StatisticKind, range: Option<&DateRange>) -> QueryKey {
    statistics()
        .with(kind.path_segment())
        .with_optional(range.map(|r| r.start_date))
        .with_optional(range.map(|r| r.end_date))
}

pub fn current_user() -> QueryKey {
    QueryKey::new("me")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_payment_key_orders_cinema_then_dates() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        );
        let key = payments_by_cinema(Some(&RecordId::Number(3)), Some(&range));
        assert_eq!(key.to_string(), "payments:3:2025-01-01:2025-01-31");
        assert!(key.starts_with(&payments()));
    }
}
