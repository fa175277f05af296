pub mod button;
pub mod clock;
pub mod hx711;
pub mod led;
pub mod net;
