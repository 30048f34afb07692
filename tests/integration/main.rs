//! Integration tests for the evtmkr CLI and library

mod helpers;

mod cli_test;
mod config_test;
mod events_test;
mod session_test;
