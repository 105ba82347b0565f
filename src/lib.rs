//! Token-game engine for place/transition Petri nets.
//!
//! [`net`] holds the net model and its description format, [`game`] plays it:
//! single firings, concurrent steps composed automatically or by hand, and
//! auto-concurrent multiplicities.
#![warn(non_snake_case)]

pub mod config;
pub mod game;
pub mod net;
pub mod options;
pub mod report;
