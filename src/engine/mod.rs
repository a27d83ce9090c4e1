pub mod distance;
pub mod verification;
