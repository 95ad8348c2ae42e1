pub mod a_star;
pub mod common;
pub mod estimators;
pub mod reference;
