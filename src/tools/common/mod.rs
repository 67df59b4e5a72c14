//! Common/built-in tools
//!
//! Tools that work directly on the run's shared state:
//! - `SetStateTool` - Store a value under a key
//! - `GetStateTool` - Read a value back

pub mod get_state;
pub mod set_state;

pub use get_state::{missing_key_message, GetStateTool};
pub use set_state::SetStateTool;
