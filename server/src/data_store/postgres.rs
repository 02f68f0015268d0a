use super::{
    models, password, schema, BookingOutcome, BookingStore, BookingStoreFacade,
    RoomDeletionOutcome, StoreError, UserId,
};
use crate::auth_session::SessionToken;
use crate::data_store::auth_token::{AuthToken, GlobalAuthToken, Privilege};
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::{debug, info};
use std::collections::HashMap;

#[derive(Clone)]
pub struct PgDataStore {
    pool: diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStore {
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        let connection_manager = diesel::r2d2::ConnectionManager::<PgConnection>::new(database_url);
        Ok(Self {
            pool: diesel::r2d2::Pool::builder()
                .test_on_check_out(true)
                .min_idle(Some(2))
                .build(connection_manager)?,
        })
    }
}

impl BookingStore for PgDataStore {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn BookingStoreFacade + 'a>, StoreError> {
        Ok(Box::new(PgDataStoreFacade::with_pooled_connection(
            self.pool.get()?,
        )))
    }
}

pub struct PgDataStoreFacade {
    connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStoreFacade {
    pub fn with_pooled_connection(
        connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
    ) -> Self {
        Self { connection }
    }
}

impl BookingStoreFacade for PgDataStoreFacade {
    fn get_rooms(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::RoomWithEventCount>, StoreError> {
        use schema::{events, rooms};
        auth_token.check_privilege(Privilege::ListRooms)?;

        self.connection.transaction(|connection| {
            let the_rooms = rooms::table
                .select(models::Room::as_select())
                .order_by((rooms::creation_date.desc(), rooms::name.asc()))
                .load::<models::Room>(connection)?;

            let event_counts: HashMap<String, i64> = events::table
                .group_by(events::room_name)
                .select((events::room_name, diesel::dsl::count(events::name)))
                .load::<(String, i64)>(connection)?
                .into_iter()
                .collect();

            Ok(the_rooms
                .into_iter()
                .map(|room| models::RoomWithEventCount {
                    event_count: event_counts.get(&room.name).copied().unwrap_or(0),
                    room,
                })
                .collect())
        })
    }

    fn create_room(
        &mut self,
        auth_token: &AuthToken,
        room: models::NewRoom,
    ) -> Result<(), StoreError> {
        use schema::rooms;
        auth_token.check_privilege(Privilege::ManageRooms)?;

        diesel::insert_into(rooms::table)
            .values(&room)
            .execute(&mut self.connection)?;
        info!("Room '{}' created by {}", room.name, auth_token.username());
        Ok(())
    }

    fn delete_room(
        &mut self,
        auth_token: &AuthToken,
        room_name: &str,
    ) -> Result<RoomDeletionOutcome, StoreError> {
        use schema::{events, rooms};
        auth_token.check_privilege(Privilege::DeleteRooms)?;

        self.connection.transaction(|connection| {
            // Creating an event takes a key share lock on the referenced room's row, so holding
            // the row lock keeps the event count valid until the room is deleted.
            rooms::table
                .filter(rooms::name.eq(room_name))
                .select(rooms::name)
                .for_update()
                .first::<String>(connection)?;

            let event_count = events::table
                .filter(events::room_name.eq(room_name))
                .count()
                .get_result::<i64>(connection)?;
            if event_count > 0 {
                debug!(
                    "Refused deleting room '{}' with {} events",
                    room_name, event_count
                );
                return Ok(RoomDeletionOutcome::HasEvents { event_count });
            }

            diesel::delete(rooms::table.filter(rooms::name.eq(room_name))).execute(connection)?;
            info!("Room '{}' deleted by {}", room_name, auth_token.username());
            Ok(RoomDeletionOutcome::Deleted)
        })
    }

    fn get_events(&mut self, auth_token: &AuthToken) -> Result<Vec<models::FullEvent>, StoreError> {
        use schema::{events, rooms};
        auth_token.check_privilege(Privilege::ShowEvents)?;
        let show_all = auth_token.has_privilege(Privilege::ShowAllEvents);

        self.connection.transaction(|connection| {
            let mut query = events::table
                .inner_join(rooms::table)
                .select((models::Event::as_select(), rooms::capacity))
                .order_by((events::creation_date.desc(), events::name.asc()))
                .into_boxed();
            if !show_all {
                query = query.filter(events::is_public.eq(true));
            }
            let the_events = query.load::<(models::Event, i32)>(connection)?;

            let booking_counts = load_booking_counts(
                the_events.iter().map(|(event, _)| event.name.as_str()),
                connection,
            )?;
            Ok(the_events
                .into_iter()
                .map(|(event, capacity)| to_full_event(event, capacity, &booking_counts))
                .collect())
        })
    }

    fn get_event(
        &mut self,
        auth_token: &AuthToken,
        event_name: &str,
    ) -> Result<models::FullEvent, StoreError> {
        use schema::{attendants, events, rooms};
        auth_token.check_privilege(Privilege::ShowEvents)?;

        self.connection.transaction(|connection| {
            let (event, capacity) = events::table
                .inner_join(rooms::table)
                .filter(events::name.eq(event_name))
                .select((models::Event::as_select(), rooms::capacity))
                .first::<(models::Event, i32)>(connection)?;
            let booking_count = attendants::table
                .filter(attendants::event_name.eq(event_name))
                .count()
                .get_result::<i64>(connection)?;
            Ok(models::FullEvent {
                event,
                capacity,
                booking_count,
            })
        })
    }

    fn create_event(
        &mut self,
        auth_token: &AuthToken,
        event: models::NewEvent,
    ) -> Result<(), StoreError> {
        use schema::events;
        auth_token.check_privilege(Privilege::ManageEvents)?;

        diesel::insert_into(events::table)
            .values(&event)
            .execute(&mut self.connection)?;
        info!(
            "Event '{}' in room '{}' created by {}",
            event.name,
            event.room_name,
            auth_token.username()
        );
        Ok(())
    }

    fn delete_event(&mut self, auth_token: &AuthToken, event_name: &str) -> Result<(), StoreError> {
        use schema::events;
        auth_token.check_privilege(Privilege::CancelEvents)?;

        // Bookings of the event are deleted by the database (ON DELETE CASCADE)
        let count = diesel::delete(events::table.filter(events::name.eq(event_name)))
            .execute(&mut self.connection)?;
        if count == 0 {
            return Err(StoreError::NotExisting);
        }
        info!("Event '{}' canceled by {}", event_name, auth_token.username());
        Ok(())
    }

    fn get_own_bookings(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::BookedEvent>, StoreError> {
        use schema::{attendants, events, rooms};
        auth_token.check_privilege(Privilege::ShowProfile)?;

        self.connection.transaction(|connection| {
            let the_bookings = attendants::table
                .inner_join(events::table.inner_join(rooms::table))
                .filter(attendants::user_id.eq(auth_token.user_id()))
                .order_by((attendants::subscription_date.desc(), attendants::id.desc()))
                .select((
                    models::Booking::as_select(),
                    models::Event::as_select(),
                    rooms::capacity,
                ))
                .load::<(models::Booking, models::Event, i32)>(connection)?;

            let booking_counts = load_booking_counts(
                the_bookings
                    .iter()
                    .map(|(booking, _, _)| booking.event_name.as_str()),
                connection,
            )?;
            Ok(the_bookings
                .into_iter()
                .map(|(booking, event, capacity)| models::BookedEvent {
                    booking,
                    event: to_full_event(event, capacity, &booking_counts),
                })
                .collect())
        })
    }

    fn book_event(
        &mut self,
        auth_token: &AuthToken,
        event_name: &str,
    ) -> Result<BookingOutcome, StoreError> {
        use schema::{attendants, events, rooms};
        auth_token.check_privilege(Privilege::BookEvents)?;
        let the_user_id = auth_token.user_id();

        self.connection.transaction(|connection| {
            // Concurrent bookings of the same event are serialized by this row lock. Thus, the
            // following checks remain valid until the booking is inserted.
            let the_event = events::table
                .filter(events::name.eq(event_name))
                .select(models::Event::as_select())
                .for_update()
                .first::<models::Event>(connection)?;

            let already_booked = diesel::select(exists(
                attendants::table
                    .filter(attendants::user_id.eq(the_user_id))
                    .filter(attendants::event_name.eq(event_name)),
            ))
            .get_result::<bool>(connection)?;
            if already_booked {
                debug!(
                    "User {} already has a booking for event '{}'",
                    the_user_id, event_name
                );
                return Ok(BookingOutcome::AlreadyBooked);
            }

            let capacity = rooms::table
                .filter(rooms::name.eq(&the_event.room_name))
                .select(rooms::capacity)
                .first::<i32>(connection)?;
            let booking_count = attendants::table
                .filter(attendants::event_name.eq(event_name))
                .count()
                .get_result::<i64>(connection)?;
            let full_event = models::FullEvent {
                event: the_event,
                capacity,
                booking_count,
            };
            if full_event.availability() <= 0 {
                debug!(
                    "Refused booking of event '{}' for user {}: no seats available",
                    event_name, the_user_id
                );
                return Ok(BookingOutcome::NoSeatsAvailable);
            }

            let booking = diesel::insert_into(attendants::table)
                .values((
                    attendants::user_id.eq(the_user_id),
                    attendants::event_name.eq(event_name),
                ))
                .returning(models::Booking::as_returning())
                .get_result::<models::Booking>(connection)?;
            info!(
                "User {} booked a seat for event '{}' (booking {})",
                auth_token.username(),
                booking.event_name,
                booking.id
            );
            Ok(BookingOutcome::Booked)
        })
    }

    fn cancel_booking(
        &mut self,
        auth_token: &AuthToken,
        event_name: &str,
    ) -> Result<(), StoreError> {
        use schema::{attendants, events};
        auth_token.check_privilege(Privilege::BookEvents)?;

        self.connection.transaction(|connection| {
            // Distinguishing a missing event from a missing booking is only relevant for logging,
            // both result in NotExisting.
            events::table
                .filter(events::name.eq(event_name))
                .select(events::name)
                .first::<String>(connection)?;

            let deleted = diesel::delete(
                attendants::table
                    .filter(attendants::user_id.eq(auth_token.user_id()))
                    .filter(attendants::event_name.eq(event_name)),
            )
            .returning(models::Booking::as_returning())
            .get_results::<models::Booking>(connection)?;
            if deleted.is_empty() {
                return Err(StoreError::NotExisting);
            }
            for booking in deleted {
                info!(
                    "Booking {} of user {} for event '{}' canceled",
                    booking.id, booking.user_id, booking.event_name
                );
            }
            Ok(())
        })
    }

    fn create_user(&mut self, user: models::NewUser) -> Result<UserId, StoreError> {
        use schema::users;

        let user_id = diesel::insert_into(users::table)
            .values(&user)
            .returning(users::id)
            .get_result::<UserId>(&mut self.connection)?;
        info!(
            "User '{}' registered with id {}{}",
            user.username,
            user_id,
            if user.is_staff { " as staff" } else { "" }
        );
        Ok(user_id)
    }

    fn get_users(&mut self, auth_token: &GlobalAuthToken) -> Result<Vec<models::User>, StoreError> {
        use schema::users;
        auth_token.check_privilege(Privilege::ManageUsers)?;

        Ok(users::table
            .select(models::User::as_select())
            .order_by(users::id)
            .load::<models::User>(&mut self.connection)?)
    }

    fn authenticate_user(&mut self, username: &str, password: &str) -> Result<UserId, StoreError> {
        use schema::users;

        let user = users::table
            .filter(users::username.eq(username))
            .select(models::User::as_select())
            .first::<models::User>(&mut self.connection)
            .optional()?;
        match user {
            Some(user) => {
                if password::verify_password(password, &user.password_hash)? {
                    Ok(user.id)
                } else {
                    Err(StoreError::NotExisting)
                }
            }
            None => {
                password::simulate_password_verification(password);
                Err(StoreError::NotExisting)
            }
        }
    }

    fn get_auth_token_for_session(
        &mut self,
        session_token: &SessionToken,
    ) -> Result<AuthToken, StoreError> {
        use schema::users;

        let (username, is_staff) = users::table
            .filter(users::id.eq(session_token.user_id()))
            .select((users::username, users::is_staff))
            .first::<(String, bool)>(&mut self.connection)?;

        Ok(AuthToken::create_for_session(
            session_token.user_id(),
            username,
            is_staff,
        ))
    }
}

/// Count the bookings of each of the given events.
///
/// Events without bookings are not contained in the resulting map.
fn load_booking_counts<'a>(
    event_names: impl Iterator<Item = &'a str>,
    connection: &mut PgConnection,
) -> Result<HashMap<String, i64>, diesel::result::Error> {
    use schema::attendants;

    let event_names: Vec<&str> = event_names.collect();
    Ok(attendants::table
        .filter(attendants::event_name.eq_any(event_names))
        .group_by(attendants::event_name)
        .select((attendants::event_name, diesel::dsl::count(attendants::id)))
        .load::<(String, i64)>(connection)?
        .into_iter()
        .collect())
}

fn to_full_event(
    event: models::Event,
    capacity: i32,
    booking_counts: &HashMap<String, i64>,
) -> models::FullEvent {
    models::FullEvent {
        booking_count: booking_counts.get(&event.name).copied().unwrap_or(0),
        event,
        capacity,
    }
}

/// Get a human-readable description of the consistency expectation that is checked by a specific
/// constraint in our Postgres database schema by the constraint's name.
///
/// Returns None, when no human-readable description is present of the given constraint name.
pub fn description_for_postgres_constraint(constraint_name: &str) -> Option<&'static str> {
    match constraint_name {
        "rooms_capacity_non_negative" => Some("Room's capacity must not be negative."),
        "events_room_name_fkey" => Some("Event's room must reference an existing room."),
        "attendants_event_name_fkey" => Some("Booking must reference an existing event."),
        "attendants_user_id_fkey" => Some("Booking must reference an existing user."),
        _ => None,
    }
}
