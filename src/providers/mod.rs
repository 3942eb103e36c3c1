pub mod evds;
pub mod spot;

pub use evds::EvdsProvider;
pub use spot::SpotRateProvider;
