pub mod errors;
pub mod db;
pub mod tenant;
pub mod principal;
pub mod provider_password;
pub mod verify_code;
