pub mod input;
pub mod timing;
