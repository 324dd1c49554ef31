pub mod catalog;
pub mod check;
pub mod combos;
pub mod label;
pub mod run;
