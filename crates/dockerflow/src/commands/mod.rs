pub mod dockerfile;
pub mod plan;
pub mod run;
pub mod tasks;
pub mod validate;
