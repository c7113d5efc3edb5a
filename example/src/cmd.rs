pub mod run;
pub mod sign;
