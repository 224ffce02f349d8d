// SPDX-License-Identifier: Apache-2.0

//! A SAX-style JSON tokenizer that is fed one byte at a time.
//!
//! The tokenizer keeps no history beyond the token currently being lexed and
//! a bit stack recording whether each open container is an object or an
//! array. Completed keys and scalar values are handed to a [`JsonListener`]
//! as text; interpreting them is the listener's job.

#![cfg_attr(not(test), no_std)]

pub mod bitstack;
pub use bitstack::BitStack;

mod tokenizer;
pub use tokenizer::{ErrKind, Error, Tokenizer};

/// Receiver for the structural events produced by [`Tokenizer`].
///
/// Only [`key`](JsonListener::key) and [`value`](JsonListener::value) are
/// required; everything else defaults to a no-op.
pub trait JsonListener {
    /// The first significant byte of the root value was seen.
    fn start_document(&mut self) {}
    /// The root value is complete.
    fn end_document(&mut self) {}
    fn start_object(&mut self) {}
    fn end_object(&mut self) {}
    fn start_array(&mut self) {}
    fn end_array(&mut self) {}
    /// An object key, with escapes resolved.
    fn key(&mut self, key: &str);
    /// A scalar value: string contents with escapes resolved, or the raw text
    /// of a number, `true`, `false` or `null`.
    fn value(&mut self, value: &str);
    /// Insignificant whitespace between tokens.
    fn whitespace(&mut self, _byte: u8) {}
}

impl<L: JsonListener + ?Sized> JsonListener for &mut L {
    fn start_document(&mut self) {
        (**self).start_document()
    }
    fn end_document(&mut self) {
        (**self).end_document()
    }
    fn start_object(&mut self) {
        (**self).start_object()
    }
    fn end_object(&mut self) {
        (**self).end_object()
    }
    fn start_array(&mut self) {
        (**self).start_array()
    }
    fn end_array(&mut self) {
        (**self).end_array()
    }
    fn key(&mut self, key: &str) {
        (**self).key(key)
    }
    fn value(&mut self, value: &str) {
        (**self).value(value)
    }
    fn whitespace(&mut self, byte: u8) {
        (**self).whitespace(byte)
    }
}
