//! Pure data structures shared by the player, the registry and the clients.

pub mod connection;
pub mod frame;
pub mod message;
pub mod order;
pub mod waypoint;

pub use connection::*;
pub use frame::*;
pub use message::*;
pub use order::*;
pub use waypoint::*;
