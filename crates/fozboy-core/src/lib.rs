//! Core of the fozboy terminal front-end.
//!
//! This crate holds everything that does not draw: panel geometry, the
//! control input state machine, the event and command types, the pure
//! update function and the logging subsystem. Rendering and the image
//! protocol live in `fozboy-ui`.

pub mod bus;
pub mod event;
pub mod input;
pub mod layout;
pub mod logging;
pub mod state;
