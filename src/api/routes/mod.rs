pub mod leagues;
pub mod players;
pub mod tournaments;
