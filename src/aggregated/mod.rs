pub mod display;
pub mod sale_state;
