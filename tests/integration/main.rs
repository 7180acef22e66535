//! End-to-end crawl tests

mod crawl_tests;
