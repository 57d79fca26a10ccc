pub mod cookie;
pub mod crud;
pub mod model;
