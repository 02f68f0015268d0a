use crate::auth_session::SessionToken;
use crate::data_store::auth_token::{AuthToken, GlobalAuthToken, Privilege};
use crate::data_store::models::{
    BookedEvent, Booking, Event, FullEvent, NewEvent, NewRoom, NewUser, Room, RoomWithEventCount,
    User,
};
use crate::data_store::{
    password, BookingOutcome, BookingStore, BookingStoreFacade, RoomDeletionOutcome, StoreError,
    UserId,
};
use std::sync::Mutex;

/**
 * A mock [BookingStore] implementation for testing.
 *
 * The simulated database consists of the [StoreMockData] structure with vectors of entities. These
 * can be directly modified by the tests.
 *
 * The mock checks privileges, entity existence and uniqueness like the database would do.
 * Additionally, the [StoreMockData.next_error] attribute can be set to simulate a database error.
 */
#[derive(Default)]
pub struct StoreMock {
    pub data: Mutex<StoreMockData>,
}

impl BookingStore for StoreMock {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn BookingStoreFacade + 'a>, StoreError> {
        Ok(Box::new(StoreMockFacade { store: self }))
    }
}

#[derive(Default)]
pub struct StoreMockData {
    pub rooms: Vec<Room>,
    pub events: Vec<Event>,
    pub bookings: Vec<Booking>,
    pub users: Vec<User>,
    /// If not none, the next call to a store facade method will return this error.
    pub next_error: Option<StoreError>,
}

impl StoreMockData {
    fn full_event(&self, event: &Event) -> Result<FullEvent, StoreError> {
        let room = self
            .rooms
            .iter()
            .find(|r| r.name == event.room_name)
            .ok_or_else(|| StoreError::InvalidDataInDatabase("Event without room".to_owned()))?;
        Ok(FullEvent {
            event: event.clone(),
            capacity: room.capacity,
            booking_count: self
                .bookings
                .iter()
                .filter(|b| b.event_name == event.name)
                .count() as i64,
        })
    }

    fn next_id<T>(items: &[T], id: impl Fn(&T) -> i32) -> i32 {
        items.iter().map(id).max().unwrap_or(0) + 1
    }
}

struct StoreMockFacade<'a> {
    store: &'a StoreMock,
}

impl StoreMockFacade<'_> {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreMockData>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(data)
    }
}

impl BookingStoreFacade for StoreMockFacade<'_> {
    fn get_rooms(&mut self, auth_token: &AuthToken) -> Result<Vec<RoomWithEventCount>, StoreError> {
        let data = self.lock()?;
        auth_token.check_privilege(Privilege::ListRooms)?;
        let mut rooms: Vec<RoomWithEventCount> = data
            .rooms
            .iter()
            .map(|room| RoomWithEventCount {
                room: room.clone(),
                event_count: data
                    .events
                    .iter()
                    .filter(|e| e.room_name == room.name)
                    .count() as i64,
            })
            .collect();
        rooms.sort_by(|a, b| b.room.creation_date.cmp(&a.room.creation_date));
        Ok(rooms)
    }

    fn create_room(&mut self, auth_token: &AuthToken, room: NewRoom) -> Result<(), StoreError> {
        let mut data = self.lock()?;
        auth_token.check_privilege(Privilege::ManageRooms)?;
        if room.capacity < 0 {
            return Err(StoreError::InvalidInputData(
                "Room's capacity must not be negative.".to_owned(),
            ));
        }
        if data.rooms.iter().any(|r| r.name == room.name) {
            return Err(StoreError::ConflictEntityExists);
        }
        data.rooms.push(Room {
            name: room.name,
            capacity: room.capacity,
            creation_date: chrono::Utc::now(),
        });
        Ok(())
    }

    fn delete_room(
        &mut self,
        auth_token: &AuthToken,
        room_name: &str,
    ) -> Result<RoomDeletionOutcome, StoreError> {
        let mut data = self.lock()?;
        auth_token.check_privilege(Privilege::DeleteRooms)?;
        if !data.rooms.iter().any(|r| r.name == room_name) {
            return Err(StoreError::NotExisting);
        }
        let event_count = data
            .events
            .iter()
            .filter(|e| e.room_name == room_name)
            .count() as i64;
        if event_count > 0 {
            return Ok(RoomDeletionOutcome::HasEvents { event_count });
        }
        data.rooms.retain(|r| r.name != room_name);
        Ok(RoomDeletionOutcome::Deleted)
    }

    fn get_events(&mut self, auth_token: &AuthToken) -> Result<Vec<FullEvent>, StoreError> {
        let data = self.lock()?;
        auth_token.check_privilege(Privilege::ShowEvents)?;
        let show_all = auth_token.has_privilege(Privilege::ShowAllEvents);
        let mut events = data
            .events
            .iter()
            .filter(|e| show_all || e.is_public)
            .map(|e| data.full_event(e))
            .collect::<Result<Vec<_>, _>>()?;
        events.sort_by(|a, b| b.event.creation_date.cmp(&a.event.creation_date));
        Ok(events)
    }

    fn get_event(&mut self, auth_token: &AuthToken, event_name: &str) -> Result<FullEvent, StoreError> {
        let data = self.lock()?;
        auth_token.check_privilege(Privilege::ShowEvents)?;
        let event = data
            .events
            .iter()
            .find(|e| e.name == event_name)
            .ok_or(StoreError::NotExisting)?;
        data.full_event(event)
    }

    fn create_event(&mut self, auth_token: &AuthToken, event: NewEvent) -> Result<(), StoreError> {
        let mut data = self.lock()?;
        auth_token.check_privilege(Privilege::ManageEvents)?;
        if data.events.iter().any(|e| e.name == event.name) {
            return Err(StoreError::ConflictEntityExists);
        }
        if !data.rooms.iter().any(|r| r.name == event.room_name) {
            return Err(StoreError::InvalidInputData(
                "Event's room must reference an existing room.".to_owned(),
            ));
        }
        data.events.push(Event {
            name: event.name,
            room_name: event.room_name,
            description: event.description,
            date: event.date,
            is_public: event.is_public,
            creation_date: chrono::Utc::now(),
        });
        Ok(())
    }

    fn delete_event(&mut self, auth_token: &AuthToken, event_name: &str) -> Result<(), StoreError> {
        let mut data = self.lock()?;
        auth_token.check_privilege(Privilege::CancelEvents)?;
        if !data.events.iter().any(|e| e.name == event_name) {
            return Err(StoreError::NotExisting);
        }
        data.events.retain(|e| e.name != event_name);
        data.bookings.retain(|b| b.event_name != event_name);
        Ok(())
    }

    fn get_own_bookings(&mut self, auth_token: &AuthToken) -> Result<Vec<BookedEvent>, StoreError> {
        let data = self.lock()?;
        auth_token.check_privilege(Privilege::ShowProfile)?;
        let mut result = Vec::new();
        for booking in data.bookings.iter().filter(|b| b.user_id == auth_token.user_id()) {
            let event = data
                .events
                .iter()
                .find(|e| e.name == booking.event_name)
                .ok_or(StoreError::NotExisting)?;
            result.push(BookedEvent {
                booking: booking.clone(),
                event: data.full_event(event)?,
            });
        }
        result.sort_by(|a, b| b.booking.id.cmp(&a.booking.id));
        Ok(result)
    }

    fn book_event(
        &mut self,
        auth_token: &AuthToken,
        event_name: &str,
    ) -> Result<BookingOutcome, StoreError> {
        let mut data = self.lock()?;
        auth_token.check_privilege(Privilege::BookEvents)?;
        let event = data
            .events
            .iter()
            .find(|e| e.name == event_name)
            .ok_or(StoreError::NotExisting)?;
        if data
            .bookings
            .iter()
            .any(|b| b.event_name == event_name && b.user_id == auth_token.user_id())
        {
            return Ok(BookingOutcome::AlreadyBooked);
        }
        if data.full_event(event)?.availability() <= 0 {
            return Ok(BookingOutcome::NoSeatsAvailable);
        }
        let id = StoreMockData::next_id(&data.bookings, |b| b.id);
        data.bookings.push(Booking {
            id,
            user_id: auth_token.user_id(),
            event_name: event_name.to_owned(),
            subscription_date: chrono::Utc::now(),
        });
        Ok(BookingOutcome::Booked)
    }

    fn cancel_booking(&mut self, auth_token: &AuthToken, event_name: &str) -> Result<(), StoreError> {
        let mut data = self.lock()?;
        auth_token.check_privilege(Privilege::BookEvents)?;
        let count_before = data.bookings.len();
        data.bookings
            .retain(|b| !(b.event_name == event_name && b.user_id == auth_token.user_id()));
        if data.bookings.len() == count_before {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }

    fn create_user(&mut self, user: NewUser) -> Result<UserId, StoreError> {
        let mut data = self.lock()?;
        if data.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::ConflictEntityExists);
        }
        let id = StoreMockData::next_id(&data.users, |u| u.id);
        data.users.push(User {
            id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            is_staff: user.is_staff,
            date_joined: chrono::Utc::now(),
        });
        Ok(id)
    }

    fn get_users(&mut self, auth_token: &GlobalAuthToken) -> Result<Vec<User>, StoreError> {
        let data = self.lock()?;
        auth_token.check_privilege(Privilege::ManageUsers)?;
        Ok(data.users.clone())
    }

    fn authenticate_user(&mut self, username: &str, password: &str) -> Result<UserId, StoreError> {
        let data = self.lock()?;
        let user = data
            .users
            .iter()
            .find(|u| u.username == username)
            .ok_or(StoreError::NotExisting)?;
        if password::verify_password(password, &user.password_hash)? {
            Ok(user.id)
        } else {
            Err(StoreError::NotExisting)
        }
    }

    fn get_auth_token_for_session(
        &mut self,
        session_token: &SessionToken,
    ) -> Result<AuthToken, StoreError> {
        let data = self.lock()?;
        let user = data
            .users
            .iter()
            .find(|u| u.id == session_token.user_id())
            .ok_or(StoreError::NotExisting)?;
        Ok(AuthToken::create_for_session(
            user.id,
            user.username.clone(),
            user.is_staff,
        ))
    }
}

/// Helpers for filling the [StoreMock] with sample data in tests
pub mod sample_data {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    pub const STAFF_USER_ID: UserId = 1;
    pub const REGULAR_USER_ID: UserId = 2;
    pub const SAMPLE_PASSWORD: &str = "sample-password";

    fn sample_user(id: UserId, username: &str, is_staff: bool) -> User {
        User {
            id,
            username: username.to_owned(),
            first_name: "".to_owned(),
            last_name: "".to_owned(),
            email: format!("{}@example.com", username),
            password_hash: password::hash_password_with_iterations(SAMPLE_PASSWORD, 1000)
                .expect("Hashing sample password failed"),
            is_staff,
            date_joined: Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap(),
        }
    }

    pub fn room(name: &str, capacity: i32) -> Room {
        Room {
            name: name.to_owned(),
            capacity,
            creation_date: Utc.with_ymd_and_hms(2026, 1, 2, 10, 0, 0).unwrap(),
        }
    }

    pub fn event(name: &str, room_name: &str, is_public: bool) -> Event {
        Event {
            name: name.to_owned(),
            room_name: room_name.to_owned(),
            description: format!("**{}** description", name),
            date: Utc::now() + Duration::days(30),
            is_public,
            creation_date: Utc.with_ymd_and_hms(2026, 1, 3, 10, 0, 0).unwrap(),
        }
    }

    pub fn booking(id: i32, user_id: UserId, event_name: &str) -> Booking {
        Booking {
            id,
            user_id,
            event_name: event_name.to_owned(),
            subscription_date: Utc.with_ymd_and_hms(2026, 1, 4, 10, 0, 0).unwrap(),
        }
    }

    /// Two users ("staff" with staff flag, "alice" without), one room "Hall" with capacity 2,
    /// a public event "Concert" and a non-public event "Rehearsal" in this room.
    pub fn fill_sample_data(data: &mut StoreMockData) {
        data.users.push(sample_user(STAFF_USER_ID, "staff", true));
        data.users.push(sample_user(REGULAR_USER_ID, "alice", false));
        data.rooms.push(room("Hall", 2));
        data.events.push(event("Concert", "Hall", true));
        data.events.push(event("Rehearsal", "Hall", false));
    }
}

#[cfg(test)]
mod tests {
    use super::sample_data::*;
    use super::*;

    fn store_with_sample_data() -> StoreMock {
        let store = StoreMock::default();
        fill_sample_data(&mut store.data.lock().unwrap());
        store
    }

    fn token(store: &StoreMock, user_id: UserId) -> AuthToken {
        store
            .get_facade()
            .unwrap()
            .get_auth_token_for_session(&SessionToken::for_user(user_id))
            .unwrap()
    }

    #[test]
    fn test_book_until_full() {
        let store = store_with_sample_data();
        {
            let mut data = store.data.lock().unwrap();
            let bob = User {
                id: 3,
                username: "bob".to_owned(),
                ..data.users[1].clone()
            };
            data.users.push(bob);
        }
        let alice = token(&store, REGULAR_USER_ID);
        let staff = token(&store, STAFF_USER_ID);
        let bob = token(&store, 3);
        let mut facade = store.get_facade().unwrap();

        assert_eq!(facade.book_event(&alice, "Concert").unwrap(), BookingOutcome::Booked);
        assert_eq!(
            facade.book_event(&alice, "Concert").unwrap(),
            BookingOutcome::AlreadyBooked
        );
        assert_eq!(facade.book_event(&staff, "Concert").unwrap(), BookingOutcome::Booked);
        assert_eq!(
            facade.book_event(&bob, "Concert").unwrap(),
            BookingOutcome::NoSeatsAvailable
        );
        assert_eq!(facade.get_event(&bob, "Concert").unwrap().availability(), 0);
    }

    #[test]
    fn test_delete_event_cascades_bookings() {
        let store = store_with_sample_data();
        store
            .data
            .lock()
            .unwrap()
            .bookings
            .push(booking(1, REGULAR_USER_ID, "Concert"));
        let staff = token(&store, STAFF_USER_ID);
        let alice = token(&store, REGULAR_USER_ID);
        let mut facade = store.get_facade().unwrap();

        assert!(matches!(
            facade.delete_event(&alice, "Concert"),
            Err(StoreError::PermissionDenied { .. })
        ));
        facade.delete_event(&staff, "Concert").unwrap();
        assert!(facade.get_own_bookings(&alice).unwrap().is_empty());
        assert!(matches!(
            facade.delete_event(&staff, "Concert"),
            Err(StoreError::NotExisting)
        ));
    }

    #[test]
    fn test_event_visibility() {
        let store = store_with_sample_data();
        let staff = token(&store, STAFF_USER_ID);
        let alice = token(&store, REGULAR_USER_ID);
        let mut facade = store.get_facade().unwrap();

        assert_eq!(facade.get_events(&staff).unwrap().len(), 2);
        let public_events = facade.get_events(&alice).unwrap();
        assert_eq!(public_events.len(), 1);
        assert_eq!(public_events[0].event.name, "Concert");
    }
}
