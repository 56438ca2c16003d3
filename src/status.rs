//! Decode status codes.
//!
//! Mirrors the status-code-per-variant shape the C lineage of this decoder
//! uses, trimmed to the error kinds the core actually produces (no FFI
//! boundary here, so no `NotUtf8`/`FormatterError`/etc.).

use core::fmt;
use core::result;

/// A convenience alias for a `Result` holding either a value or a [`Status`].
pub type Result<T = ()> = result::Result<T, Status>;

/// Status code describing why a decode failed.
///
/// `Status` values that are not errors (a successful decode) are represented
/// by `Ok(_)` in the `Result` returned from [`crate::Decoder::decode`]; this
/// enum only ever appears on the `Err` side.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Status {
    /// No input bytes were supplied at all.
    NoMoreData,
    /// The input ran out partway through decoding an instruction.
    EndOfInput,
    /// Decoding the instruction would exceed the 15-byte length cap.
    InstructionTooLong,
    /// The opcode tree walk reached an `INVALID` leaf, or the decoder state
    /// was otherwise inconsistent with every definition on the matched path.
    DecodingError,
    /// A `REX` prefix was shadowed by a later-decoded `VEX`/`EVEX`/`MVEX`/
    /// `XOP` escape, or was not the last legacy prefix before the opcode.
    IllegalRex,
    /// A mandatory-prefix candidate (`66`/`F2`/`F3`) preceded a
    /// `VEX`/`EVEX`/`MVEX`/`XOP` escape.
    IllegalLegacyPfx,
    /// An escape prefix encoded an opcode-map value outside its legal range.
    InvalidMap,
    /// The `EVEX` prefix's reserved bits were not as required.
    MalformedEvex,
    /// The `MVEX` prefix was otherwise malformed.
    MalformedMvex,
    /// An operand referenced a register id with no valid register (e.g. an
    /// invalid segment register in 64-bit mode).
    BadRegister,
    /// A `VSIB` memory operand was required but `ModRM.rm` did not encode a
    /// `SIB` byte.
    InvalidVsib,
    /// An `EVEX`/`MVEX` mask register reference was invalid for the
    /// instruction's masking rules.
    InvalidMask,
}

impl Status {
    /// A human readable description of this status code.
    pub fn description(self) -> &'static str {
        match self {
            Status::NoMoreData => {
                "an attempt was made to read data from an input that has no more data available"
            }
            Status::EndOfInput => "ran out of bytes while decoding an instruction",
            Status::InstructionTooLong => {
                "the instruction exceeded the maximum length of 15 bytes"
            }
            Status::DecodingError => {
                "a general error occurred while decoding the current instruction; the \
                 instruction might be undefined"
            }
            Status::IllegalRex => {
                "a REX prefix was found in an illegal position relative to a VEX/EVEX/MVEX/XOP \
                 escape"
            }
            Status::IllegalLegacyPfx => {
                "a legacy prefix (66/F2/F3) was found while decoding a VEX/EVEX/MVEX/XOP \
                 instruction"
            }
            Status::InvalidMap => {
                "an invalid opcode-map value was found while decoding a VEX/EVEX/MVEX/XOP prefix"
            }
            Status::MalformedEvex => "an error occurred while decoding the EVEX prefix",
            Status::MalformedMvex => "an error occurred while decoding the MVEX prefix",
            Status::BadRegister => "the instruction encoded an invalid register",
            Status::InvalidVsib => "a VSIB memory operand was required but no SIB byte was present",
            Status::InvalidMask => "an invalid write-mask was specified for an EVEX/MVEX instruction",
        }
    }

    /// Whether a caller doing a linear sweep can recover from this status by
    /// advancing one byte and trying again (every status except
    /// [`Status::NoMoreData`] on an empty input).
    pub fn is_recoverable(self) -> bool {
        !matches!(self, Status::NoMoreData)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Status {}

/// The error [`crate::Decoder::decode`] returns.
///
/// Every non-fatal `status` (anything but [`Status::NoMoreData`] on an
/// empty buffer) comes with `partial` populated per spec.md §4.10/§7: a
/// synthetic 1-byte record carrying only `length = 1`, the first input
/// byte, and a blank definition otherwise, so a caller sweeping a buffer
/// can recover by advancing past it. `partial` is `None` only for
/// [`Status::NoMoreData`], which is fatal for the call — there is nothing
/// to report and nothing to recover from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DecodeError {
    pub status: Status,
    pub partial: Option<crate::decoder::DecodedInstruction>,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}
