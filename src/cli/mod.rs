//! Terminal front-end over the rate resolver and series aggregator.

pub mod rate;
pub mod record;
pub mod series;
pub mod setup;
pub mod ui;
