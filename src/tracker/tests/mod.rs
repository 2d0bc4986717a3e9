//! Unit tests for the tracker facade.
