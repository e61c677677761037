pub mod bracket;
pub mod common;
pub mod fixtures;
pub mod health;
pub mod live;
pub mod phase;
pub mod sse;
pub mod validation;
