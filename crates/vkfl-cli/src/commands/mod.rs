pub mod classify;
pub mod locate;
pub mod resolve;
