pub mod calc;
pub mod convert;
pub mod history;
pub mod rates;
pub mod setup;
pub mod ui;
