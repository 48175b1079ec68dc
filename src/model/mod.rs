pub mod attendance;
pub mod correction_request;
pub mod role;
pub mod user;
