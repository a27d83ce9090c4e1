pub mod fix;
pub mod session;
