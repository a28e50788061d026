//! Console device boundary.
//!
//! Stand-in for the byte-oriented `getch`/`putch` console the original
//! kernel talks to directly. Not buffered: one call moves exactly one byte.

/// A byte-oriented, unbuffered console.
pub trait ConsoleDevice: Send + Sync {
    /// Block until one character is available and return it.
    fn getch(&self) -> u8;

    /// Write one character, blocking if the device is busy.
    fn putch(&self, byte: u8);
}
