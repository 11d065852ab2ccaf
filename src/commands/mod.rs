pub mod general;
pub mod lol;
pub mod tournament;
