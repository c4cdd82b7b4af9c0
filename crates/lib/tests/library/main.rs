mod common;

mod config_tests;
mod object_store_tests;
mod stores_tests;
