pub mod ask;
pub mod session;
