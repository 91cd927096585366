mod gate;
mod store;

pub use gate::{GateContext, GateOutcome, SessionGate};
pub use store::SessionStore;
