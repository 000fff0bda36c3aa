//! Session flows on paused time

mod flow_tests;
