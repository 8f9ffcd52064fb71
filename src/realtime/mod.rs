pub mod frames;
pub mod registry;
pub mod session;

pub use frames::ServerFrame;
pub use registry::{ConnectionHandle, ConnectionId, ConnectionRegistry, ConnectionState};
pub use session::run_session;
