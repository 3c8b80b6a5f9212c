pub mod cursors;
pub mod presence;
pub mod registry;
pub mod room;

pub use cursors::CursorBroadcaster;
pub use presence::{Participant, PresenceManager};
pub use registry::{AuthenticatedClient, Connection, ConnectionRegistry, Credential};
pub use room::{Outbox, RoomHandle};
