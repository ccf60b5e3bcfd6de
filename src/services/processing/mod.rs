pub mod date;
pub mod extraction;
pub mod grid;
pub mod layout;
pub mod reconcile;
