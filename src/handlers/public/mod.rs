// Public handlers: service descriptor, health probe and the WebSocket upgrade.
// The upgrade authenticates itself from the `token` query parameter because
// browsers cannot set headers on a WebSocket handshake.
pub mod socket;
pub mod system;

pub use socket::socket_upgrade;
pub use system::{health, not_found, root};
