mod append_tests;
mod common;
mod seed_tests;
