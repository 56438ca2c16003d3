//! A length-disassembler and semantic decoder for x86 and x86-64 machine
//! code: turns a byte buffer into a structured instruction record (mnemonic,
//! operands, prefixes, AVX metadata) without executing or symbolically
//! interpreting anything.
//!
//! ```
//! use zydec::{Decoder, MachineMode};
//!
//! let decoder = Decoder::new(MachineMode::Long64);
//! let instruction = decoder.decode(&[0x90]).unwrap();
//! assert_eq!(instruction.mnemonic, zydec::Mnemonic::NOP);
//! assert_eq!(instruction.length, 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::too_many_arguments)]

mod decoder;
mod enums;
mod status;
mod tables;

pub use decoder::{
    AvxInfo, Decoder, DecodedInstruction, DecodedOperand, ImmediateOperand, InstructionIterator,
    MemoryOperand, OperandKind, PointerOperand,
};
pub use enums::{
    AddressWidth, BranchType, BroadcastMode, ConversionMode, DecoderMode, ElementType,
    EvexFunctionality, ExceptionClass, Granularity, InstructionAttributes, InstructionCategory,
    InstructionEncoding, IsaExt, IsaSet, MachineMode, MaskMode, MemoryOperandType, Mnemonic,
    OpcodeMap, OperandAction, OperandEncoding, OperandType, OperandVisibility, Prefix, PrefixType,
    Register, RegisterClass, RoundingMode, SwizzleMode, TupleType,
};
pub use status::{DecodeError, Result, Status};
