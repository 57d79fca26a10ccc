pub mod controller;
pub mod prompt;
pub mod routes;
pub mod schema;
