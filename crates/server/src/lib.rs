pub mod access;
pub mod errors;
pub mod observability;
pub mod routes;
pub mod session;
pub mod startup;
pub mod state;

pub use startup::run;
