//! Terminal presentation for fozboy.
//!
//! [`view`] draws the device panel, its controls and the placeholder
//! screens into a ratatui buffer. [`kitty`] encodes the screen image for
//! the kitty graphics protocol; its escapes are written straight to the
//! terminal because ratatui's cell buffer cannot hold them.

pub mod kitty;
pub mod view;
