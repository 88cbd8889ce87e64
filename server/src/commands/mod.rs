pub mod errors;
pub mod serve;
