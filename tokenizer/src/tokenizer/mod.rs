// SPDX-License-Identifier: Apache-2.0

use crate::bitstack::BitStack;
use crate::JsonListener;

use log::{debug, trace};

#[derive(Debug, Clone, Copy)]
struct ParseContext<T: BitStack> {
    /// Number of open containers
    depth: u8,
    /// One bit per open container, `true` for objects
    stack: T,
}

impl<T: BitStack> ParseContext<T> {
    fn new() -> Self {
        ParseContext {
            depth: 0,
            stack: T::empty(),
        }
    }
    fn enter(&mut self, object: bool, data: u8, pos: usize) -> Result<(), Error> {
        if self.depth == T::CAPACITY {
            return Error::new(ErrKind::MaxDepthReached, data, pos);
        }
        self.stack.push(object);
        self.depth += 1;
        Ok(())
    }
    /// Closes the innermost container, returning whether it was an object.
    fn exit(&mut self) -> bool {
        self.depth = self.depth.saturating_sub(1);
        self.stack.pop()
    }
    fn in_object(&self) -> bool {
        self.depth > 0 && self.stack.top()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    String { key: bool, escape: Escape },
    Number(Num),
    Literal { text: &'static str, matched: u8 },
    Object(Object),
    Array(Array),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Escape {
    None,
    Backslash,
    Unicode { digits: u8, code: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Num {
    Sign,
    LeadingZero,
    BeforeDecimalPoint,
    Decimal,
    AfterDecimalPoint,
    Exponent,
    ExponentSign,
    AfterExponent,
}

impl Num {
    fn is_complete(self) -> bool {
        matches!(
            self,
            Num::LeadingZero | Num::BeforeDecimalPoint | Num::AfterDecimalPoint | Num::AfterExponent
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Object {
    KeyOrEnd,
    Key,
    Colon,
    Value,
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Array {
    ItemOrEnd,
    Item,
    CommaOrEnd,
}

/// Holds the text of the token being lexed. Bytes past capacity are dropped.
struct TokenBuffer<const N: usize> {
    bytes: [u8; N],
    len: usize,
    truncated: bool,
}

impl<const N: usize> TokenBuffer<N> {
    const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
            truncated: false,
        }
    }

    fn clear(&mut self) {
        self.len = 0;
        self.truncated = false;
    }

    fn push(&mut self, byte: u8) {
        if self.truncated || self.len == N {
            self.truncated = true;
            return;
        }
        self.bytes[self.len] = byte;
        self.len += 1;
    }

    fn push_char(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        let encoded = c.encode_utf8(&mut utf8).as_bytes();
        if self.truncated || self.len + encoded.len() > N {
            self.truncated = true;
            return;
        }
        self.bytes[self.len..self.len + encoded.len()].copy_from_slice(encoded);
        self.len += encoded.len();
    }

    /// The longest valid UTF-8 prefix of the buffered bytes.
    fn as_str(&self) -> &str {
        let bytes = &self.bytes[..self.len];
        match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
        }
    }
}

/// Byte-at-a-time JSON tokenizer.
///
/// * `T` - bit stack type; its width is the maximum nesting depth
/// * `N` - capacity in bytes of the key/value text buffer
pub struct Tokenizer<T: BitStack = u32, const N: usize = 64> {
    state: State,
    context: ParseContext<T>,
    token: TokenBuffer<N>,
    high_surrogate: Option<u16>,
    total_consumed: usize,
}

#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Error {
    kind: ErrKind,
    character: u8,
    position: usize,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrKind {
    EmptyStream,
    UnfinishedStream,
    InvalidRoot,
    InvalidToken,
    UnescapedControlCharacter,
    TrailingComma,
    TrailingContent,
    MaxDepthReached,
    InvalidNumber,
    InvalidUnicodeEscape,
    InvalidStringEscape,
    ExpectedObjectKey,
    ExpectedObjectValue,
    ExpectedColon,
    ExpectedArrayItem,
    ExpectedCommaOrEnd,
}

impl Error {
    pub fn new<T>(kind: ErrKind, character: u8, position: usize) -> Result<T, Self> {
        Err(Self {
            kind,
            character,
            position,
        })
    }

    pub fn kind(&self) -> ErrKind {
        self.kind
    }

    /// The offending byte.
    pub fn character(&self) -> u8 {
        self.character
    }

    /// Zero-based offset of the offending byte within everything fed so far.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:?}({}) at {}",
            self.kind, self.character as char, self.position
        )
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:?} at byte {} ({:?})",
            self.kind, self.position, self.character as char
        )
    }
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BitStack, const N: usize> Tokenizer<T, N> {
    pub fn new() -> Self {
        Tokenizer {
            state: State::Idle,
            context: ParseContext::new(),
            token: TokenBuffer::new(),
            high_surrogate: None,
            total_consumed: 0,
        }
    }

    /// Returns the tokenizer to its initial state so it can lex a new document.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.context = ParseContext::new();
        self.token.clear();
        self.high_surrogate = None;
        self.total_consumed = 0;
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> u8 {
        self.context.depth
    }

    /// Number of bytes fed so far.
    pub fn consumed(&self) -> usize {
        self.total_consumed
    }

    /// Whether the first significant byte of the document has been seen.
    pub fn is_started(&self) -> bool {
        self.state != State::Idle
    }

    /// Whether the root value is complete. Only whitespace may follow.
    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    /// Feeds a single byte, emitting any events it completes to `listener`.
    pub fn feed<L>(&mut self, byte: u8, listener: &mut L) -> Result<(), Error>
    where
        L: JsonListener + ?Sized,
    {
        let pos = self.total_consumed;
        self.total_consumed += 1;
        trace!(
            "Pos: {}, Byte: {:?}, State: {:?}, Depth: {}",
            pos,
            byte as char,
            self.state,
            self.context.depth
        );

        match self.state {
            State::String { key, escape } => self.string_byte(key, escape, byte, pos, listener),
            State::Number(num) => self.number_byte(num, byte, pos, listener),
            State::Literal { text, matched } => {
                self.literal_byte(text, matched, byte, pos, listener)
            }
            _ => self.structural_byte(byte, pos, listener),
        }
    }

    /// Feeds every byte of `data`, stopping at the first error.
    pub fn feed_slice<L>(&mut self, data: &[u8], listener: &mut L) -> Result<usize, Error>
    where
        L: JsonListener + ?Sized,
    {
        for &byte in data {
            self.feed(byte, listener)?;
        }
        Ok(self.total_consumed)
    }

    /// Signals end of input. A root-level number has no closing delimiter, so
    /// it is only emitted here.
    pub fn finish<L>(&mut self, listener: &mut L) -> Result<usize, Error>
    where
        L: JsonListener + ?Sized,
    {
        debug!("--finished-- {}", self.total_consumed);
        match self.state {
            State::Finished => Ok(self.total_consumed),
            State::Idle => Error::new(ErrKind::EmptyStream, b' ', self.total_consumed),
            State::Number(num) if self.context.depth == 0 && num.is_complete() => {
                listener.value(self.token.as_str());
                self.state = self.after_value(listener);
                Ok(self.total_consumed)
            }
            _ => Error::new(ErrKind::UnfinishedStream, b' ', self.total_consumed),
        }
    }

    /// Feeds a complete document and finishes it.
    pub fn parse_full<L>(&mut self, data: &[u8], listener: &mut L) -> Result<usize, Error>
    where
        L: JsonListener + ?Sized,
    {
        self.feed_slice(data, listener)?;
        self.finish(listener)
    }

    fn after_value<L>(&mut self, listener: &mut L) -> State
    where
        L: JsonListener + ?Sized,
    {
        if self.context.depth == 0 {
            listener.end_document();
            State::Finished
        } else if self.context.in_object() {
            State::Object(Object::CommaOrEnd)
        } else {
            State::Array(Array::CommaOrEnd)
        }
    }

    fn close_container<L>(&mut self, listener: &mut L) -> State
    where
        L: JsonListener + ?Sized,
    {
        if self.context.exit() {
            listener.end_object();
        } else {
            listener.end_array();
        }
        self.after_value(listener)
    }

    fn begin_value<L>(
        &mut self,
        byte: u8,
        pos: usize,
        listener: &mut L,
        unexpected: ErrKind,
    ) -> Result<State, Error>
    where
        L: JsonListener + ?Sized,
    {
        self.token.clear();
        self.high_surrogate = None;
        Ok(match byte {
            b'{' => {
                self.context.enter(true, byte, pos)?;
                listener.start_object();
                State::Object(Object::KeyOrEnd)
            }
            b'[' => {
                self.context.enter(false, byte, pos)?;
                listener.start_array();
                State::Array(Array::ItemOrEnd)
            }
            b'"' => State::String {
                key: false,
                escape: Escape::None,
            },
            b'-' => {
                self.token.push(byte);
                State::Number(Num::Sign)
            }
            b'0' => {
                self.token.push(byte);
                State::Number(Num::LeadingZero)
            }
            b'1'..=b'9' => {
                self.token.push(byte);
                State::Number(Num::BeforeDecimalPoint)
            }
            b't' => State::Literal {
                text: "true",
                matched: 1,
            },
            b'f' => State::Literal {
                text: "false",
                matched: 1,
            },
            b'n' => State::Literal {
                text: "null",
                matched: 1,
            },
            _ => return Error::new(unexpected, byte, pos),
        })
    }

    fn structural_byte<L>(&mut self, byte: u8, pos: usize, listener: &mut L) -> Result<(), Error>
    where
        L: JsonListener + ?Sized,
    {
        if is_whitespace(byte) {
            listener.whitespace(byte);
            return Ok(());
        }

        self.state = match (self.state, byte) {
            (State::Idle, _) => {
                listener.start_document();
                self.begin_value(byte, pos, listener, ErrKind::InvalidRoot)?
            }
            (State::Object(Object::KeyOrEnd | Object::Key), b'"') => {
                self.token.clear();
                self.high_surrogate = None;
                State::String {
                    key: true,
                    escape: Escape::None,
                }
            }
            (State::Object(Object::KeyOrEnd), b'}') => self.close_container(listener),
            (State::Object(Object::Key), b'}') => {
                return Error::new(ErrKind::TrailingComma, byte, pos)
            }
            (State::Object(Object::KeyOrEnd | Object::Key), _) => {
                return Error::new(ErrKind::ExpectedObjectKey, byte, pos)
            }
            (State::Object(Object::Colon), b':') => State::Object(Object::Value),
            (State::Object(Object::Colon), _) => {
                return Error::new(ErrKind::ExpectedColon, byte, pos)
            }
            (State::Object(Object::Value), _) => {
                self.begin_value(byte, pos, listener, ErrKind::ExpectedObjectValue)?
            }
            (State::Object(Object::CommaOrEnd), b',') => State::Object(Object::Key),
            (State::Object(Object::CommaOrEnd), b'}') => self.close_container(listener),
            (State::Array(Array::ItemOrEnd), b']') => self.close_container(listener),
            (State::Array(Array::Item), b']') => {
                return Error::new(ErrKind::TrailingComma, byte, pos)
            }
            (State::Array(Array::ItemOrEnd | Array::Item), _) => {
                self.begin_value(byte, pos, listener, ErrKind::ExpectedArrayItem)?
            }
            (State::Array(Array::CommaOrEnd), b',') => State::Array(Array::Item),
            (State::Array(Array::CommaOrEnd), b']') => self.close_container(listener),
            (State::Object(Object::CommaOrEnd) | State::Array(Array::CommaOrEnd), _) => {
                return Error::new(ErrKind::ExpectedCommaOrEnd, byte, pos)
            }
            (State::Finished, _) => return Error::new(ErrKind::TrailingContent, byte, pos),
            _ => return Error::new(ErrKind::InvalidToken, byte, pos),
        };
        Ok(())
    }

    fn number_byte<L>(&mut self, num: Num, byte: u8, pos: usize, listener: &mut L) -> Result<(), Error>
    where
        L: JsonListener + ?Sized,
    {
        let next = match (num, byte) {
            (Num::Sign, b'0') => Some(Num::LeadingZero),
            (Num::Sign | Num::BeforeDecimalPoint, b'0'..=b'9') => Some(Num::BeforeDecimalPoint),
            (Num::LeadingZero | Num::BeforeDecimalPoint, b'.') => Some(Num::Decimal),
            (Num::Decimal | Num::AfterDecimalPoint, b'0'..=b'9') => Some(Num::AfterDecimalPoint),
            (
                Num::LeadingZero | Num::BeforeDecimalPoint | Num::AfterDecimalPoint,
                b'e' | b'E',
            ) => Some(Num::Exponent),
            (Num::Exponent, b'+' | b'-') => Some(Num::ExponentSign),
            (Num::Exponent | Num::ExponentSign | Num::AfterExponent, b'0'..=b'9') => {
                Some(Num::AfterExponent)
            }
            _ => None,
        };

        if let Some(next) = next {
            self.token.push(byte);
            self.state = State::Number(next);
            return Ok(());
        }
        if !num.is_complete() {
            return Error::new(ErrKind::InvalidNumber, byte, pos);
        }

        // The delimiter that ended the number still has to be handled.
        listener.value(self.token.as_str());
        self.state = self.after_value(listener);
        self.structural_byte(byte, pos, listener)
    }

    fn literal_byte<L>(
        &mut self,
        text: &'static str,
        matched: u8,
        byte: u8,
        pos: usize,
        listener: &mut L,
    ) -> Result<(), Error>
    where
        L: JsonListener + ?Sized,
    {
        if text.as_bytes().get(matched as usize) != Some(&byte) {
            return Error::new(ErrKind::InvalidToken, byte, pos);
        }
        let matched = matched + 1;
        if matched as usize == text.len() {
            listener.value(text);
            self.state = self.after_value(listener);
        } else {
            self.state = State::Literal { text, matched };
        }
        Ok(())
    }

    fn string_byte<L>(
        &mut self,
        key: bool,
        escape: Escape,
        byte: u8,
        pos: usize,
        listener: &mut L,
    ) -> Result<(), Error>
    where
        L: JsonListener + ?Sized,
    {
        let escape = match escape {
            Escape::None => match byte {
                b'"' => {
                    self.flush_surrogate();
                    self.end_string(key, listener);
                    return Ok(());
                }
                b'\\' => Escape::Backslash,
                0x00..=0x1F => {
                    return Error::new(ErrKind::UnescapedControlCharacter, byte, pos);
                }
                _ => {
                    self.flush_surrogate();
                    self.token.push(byte);
                    Escape::None
                }
            },
            Escape::Backslash => {
                let unescaped = match byte {
                    b'"' | b'\\' | b'/' => byte,
                    b'b' => 0x08,
                    b'f' => 0x0C,
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'u' => {
                        self.state = State::String {
                            key,
                            escape: Escape::Unicode { digits: 0, code: 0 },
                        };
                        return Ok(());
                    }
                    _ => return Error::new(ErrKind::InvalidStringEscape, byte, pos),
                };
                self.flush_surrogate();
                self.token.push(unescaped);
                Escape::None
            }
            Escape::Unicode { digits, code } => {
                let digit = match (byte as char).to_digit(16) {
                    Some(d) => d as u16,
                    None => return Error::new(ErrKind::InvalidUnicodeEscape, byte, pos),
                };
                let code = (code << 4) | digit;
                if digits < 3 {
                    Escape::Unicode {
                        digits: digits + 1,
                        code,
                    }
                } else {
                    self.push_code_unit(code);
                    Escape::None
                }
            }
        };
        self.state = State::String { key, escape };
        Ok(())
    }

    fn end_string<L>(&mut self, key: bool, listener: &mut L)
    where
        L: JsonListener + ?Sized,
    {
        if self.token.truncated {
            debug!("token truncated to {} bytes", N);
        }
        if key {
            listener.key(self.token.as_str());
            self.state = State::Object(Object::Colon);
        } else {
            listener.value(self.token.as_str());
            self.state = self.after_value(listener);
        }
    }

    /// Appends one UTF-16 code unit from a `\uXXXX` escape, pairing surrogates.
    fn push_code_unit(&mut self, code: u16) {
        match code {
            0xD800..=0xDBFF => {
                self.flush_surrogate();
                self.high_surrogate = Some(code);
            }
            0xDC00..=0xDFFF => {
                let c = match self.high_surrogate.take() {
                    Some(high) => {
                        let scalar =
                            0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(code) - 0xDC00);
                        char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER)
                    }
                    None => char::REPLACEMENT_CHARACTER,
                };
                self.token.push_char(c);
            }
            _ => {
                self.flush_surrogate();
                self.token
                    .push_char(char::from_u32(u32::from(code)).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }

    /// A high surrogate not followed by a low one becomes U+FFFD.
    fn flush_surrogate(&mut self) {
        if self.high_surrogate.take().is_some() {
            self.token.push_char(char::REPLACEMENT_CHARACTER);
        }
    }
}
