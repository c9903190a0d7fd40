pub mod describe;
pub mod list;
pub mod run;
pub mod show_config;
pub mod validate;
