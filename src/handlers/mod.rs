// handlers/mod.rs - two security tiers
//
// Public (no auth, or self-authenticating like the socket upgrade)
// Protected (Bearer JWT, customer identity injected by middleware)
pub mod protected;
pub mod public;
