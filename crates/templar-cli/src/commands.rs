pub mod align;
pub mod data;
pub mod search;
