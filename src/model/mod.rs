pub mod bar;
pub mod message;
pub mod period;
pub mod update;
