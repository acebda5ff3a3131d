pub mod batch;
pub mod display;
pub mod roic;
pub mod scenarios;
