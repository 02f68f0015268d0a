pub mod auth;
pub mod booking;
pub mod cancel_event;
pub mod delete_room;
pub mod event_details;
pub mod index;
pub mod new_event;
pub mod new_room;
pub mod profile;
pub mod rooms_list;
