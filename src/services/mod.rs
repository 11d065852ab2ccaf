pub mod ddragon;
pub mod riot_api;
pub mod translate;
