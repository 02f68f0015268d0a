use crate::data_store::{BookingId, UserId};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Clone, Debug, Queryable, Selectable)]
#[diesel(table_name=super::schema::rooms)]
pub struct Room {
    pub name: String,
    pub capacity: i32,
    pub creation_date: DateTime<Utc>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name=super::schema::rooms)]
pub struct NewRoom {
    pub name: String,
    pub capacity: i32,
}

#[derive(Clone, Debug)]
pub struct RoomWithEventCount {
    pub room: Room,
    pub event_count: i64,
}

#[derive(Clone, Debug, Queryable, Selectable)]
#[diesel(table_name=super::schema::events)]
pub struct Event {
    pub name: String,
    pub room_name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub is_public: bool,
    pub creation_date: DateTime<Utc>,
}

impl Event {
    /// An event is active as long as it has not started yet.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.date > now
    }
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name=super::schema::events)]
pub struct NewEvent {
    pub name: String,
    pub room_name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub is_public: bool,
}

/// An event together with the data required for calculating its availability
#[derive(Clone, Debug)]
pub struct FullEvent {
    pub event: Event,
    /// Capacity of the event's room
    pub capacity: i32,
    /// Number of bookings for this event
    pub booking_count: i64,
}

impl FullEvent {
    /// Number of remaining seats: the room's capacity minus the number of bookings
    ///
    /// The result may be negative, if the room's capacity has been reduced after the event has been
    /// booked. Only a strictly positive availability allows further bookings.
    pub fn availability(&self) -> i64 {
        i64::from(self.capacity) - self.booking_count
    }
}

#[derive(Clone, Debug, Queryable, Selectable)]
#[diesel(table_name=super::schema::attendants)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub event_name: String,
    pub subscription_date: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct BookedEvent {
    pub booking: Booking,
    pub event: FullEvent,
}

#[derive(Clone, Debug, Queryable, Selectable)]
#[diesel(table_name=super::schema::users)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name=super::schema::users)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// The password hash, as created by [super::password::hash_password]
    pub password_hash: String,
    pub is_staff: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> Event {
        Event {
            name: "Concert".to_owned(),
            room_name: "Hall".to_owned(),
            description: "".to_owned(),
            date: Utc.with_ymd_and_hms(2026, 5, 1, 19, 0, 0).unwrap(),
            is_public: true,
            creation_date: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_availability() {
        let mut event = FullEvent {
            event: sample_event(),
            capacity: 3,
            booking_count: 1,
        };
        assert_eq!(event.availability(), 2);
        event.booking_count = 3;
        assert_eq!(event.availability(), 0);
        // capacity reduced after booking: no floor at zero
        event.capacity = 1;
        assert_eq!(event.availability(), -2);
    }

    #[test]
    fn test_is_active() {
        let event = sample_event();
        assert!(event.is_active(Utc.with_ymd_and_hms(2026, 4, 30, 0, 0, 0).unwrap()));
        assert!(!event.is_active(event.date));
        assert!(!event.is_active(Utc.with_ymd_and_hms(2026, 5, 2, 0, 0, 0).unwrap()));
    }
}
