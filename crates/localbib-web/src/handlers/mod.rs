pub mod index;
pub mod raw;
pub mod reload;
