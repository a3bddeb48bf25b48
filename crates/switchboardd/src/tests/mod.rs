//! Test suites for the switchboard daemon.

mod round_trip;
mod support;
