//! Persistence for button definitions

mod buttons;

pub use buttons::{ButtonLibrary, StoredButton};
