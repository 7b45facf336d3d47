//! Daybook Shared - Process bootstrap used by every binary

pub mod bootstrap;
