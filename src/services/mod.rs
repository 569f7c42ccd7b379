pub mod creator;
pub mod preview;
pub mod realtime;
pub mod strategy;
pub mod theme;
