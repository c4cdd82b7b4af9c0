mod common;

mod copy_tests;
mod delete_tests;
mod info_tests;
