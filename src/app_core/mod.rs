//! Shared application core: state, input types, reducer, and request dispatch.

pub mod dispatch;
pub mod input;
pub mod reducer;
pub mod state;
