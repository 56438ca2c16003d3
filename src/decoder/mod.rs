//! The public `Decoder` type and the decode pipeline that wires the
//! componentized stages (spec.md §2, §4.10) together.

mod attributes;
mod avx;
mod cursor;
mod escape;
mod modrm;
mod operands;
mod prefix;
pub mod record;
pub mod sizes;
pub mod state;
pub mod tree;

pub use record::{
    AvxInfo, DecodedInstruction, DecodedOperand, ImmediateOperand, MemoryOperand, OperandKind,
    PointerOperand,
};

use crate::enums::{AddressWidth, DecoderMode, Granularity, MachineMode, Mnemonic, Register};
use crate::status::{DecodeError, Result, Status};
use crate::tables;
use state::DecodeState;

/// Decodes x86/x86-64 instructions from a byte buffer under a fixed machine
/// mode, address width, and output granularity (spec.md §4, §6.1).
#[derive(Copy, Clone, Debug)]
pub struct Decoder {
    machine_mode: MachineMode,
    address_width: AddressWidth,
    granularity: Granularity,
    mode: DecoderMode,
}

impl Decoder {
    /// Creates a decoder targeting `machine_mode`, defaulting the stack/
    /// `MOFFS` address width to `machine_mode`'s native width and
    /// [`Granularity::Full`].
    pub fn new(machine_mode: MachineMode) -> Self {
        let address_width = match machine_mode {
            MachineMode::Long16 => AddressWidth::Width16,
            MachineMode::Long32 => AddressWidth::Width32,
            MachineMode::Long64 => AddressWidth::Width64,
        };
        log::debug!(
            "configuring decoder for {:?} (default address width {:?})",
            machine_mode,
            address_width
        );
        Decoder { machine_mode, address_width, granularity: Granularity::Full, mode: DecoderMode::empty() }
    }

    /// Overrides the stack/`MOFFS` address width (spec.md §6.1 notes this
    /// defaults to, but need not equal, the machine mode's native width).
    pub fn with_address_width(mut self, address_width: AddressWidth) -> Self {
        self.address_width = address_width;
        self
    }

    /// Sets how much of [`DecodedInstruction`] a decode call populates.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Enables the given optional decoder modes in addition to any already
    /// set.
    pub fn enable_mode(mut self, mode: DecoderMode) -> Self {
        self.mode |= mode;
        self
    }

    /// Decodes a single instruction starting at the front of `buffer`.
    ///
    /// On a non-fatal decode error, the returned [`DecodeError`] carries a
    /// synthetic 1-byte `partial` record (spec.md §4.10/§7) so the caller
    /// (or [`InstructionIterator`]) can advance by `1` byte and retry; this
    /// function does not do that itself. Only an empty `buffer`
    /// ([`Status::NoMoreData`]) is fatal with no `partial` at all.
    pub fn decode(&self, buffer: &[u8]) -> core::result::Result<DecodedInstruction, DecodeError> {
        if buffer.is_empty() {
            return Err(DecodeError { status: Status::NoMoreData, partial: None });
        }

        self.decode_inner(buffer).map_err(|status| DecodeError {
            status,
            partial: Some(DecodedInstruction::error_stub(self.machine_mode, buffer[0])),
        })
    }

    fn decode_inner(&self, buffer: &[u8]) -> Result<DecodedInstruction> {
        let mut state = DecodeState::new(buffer, self.machine_mode, self.address_width);
        prefix::collect(&mut state)?;

        state.address_size = sizes::resolve_address_size(self.machine_mode, state.address_size_override);
        state.easz_index = sizes::size_index(state.address_size);

        let walk = tree::walk(&mut state, tables::root())?;
        let mut def = walk.def;

        state.operand_size = sizes::resolve_operand_size(
            def.operand_size_map,
            self.machine_mode,
            state.operand_size_override,
            state.rex_w() == 1,
        );
        state.eosz_index = sizes::size_index(state.operand_size);

        let minimal = self.mode.contains(DecoderMode::MINIMAL);

        let avx_info = if minimal {
            None
        } else {
            avx::resolve(&state, def)?
        };

        let mut operands = operands::materialize(&mut state, def, avx_info.as_ref())?;

        if walk.needs_trailing_opcode {
            let byte = state.cursor.next()?;
            state.trailing_opcode = Some(byte);
            state.opcode = byte;
            def = tables::threednow_def(byte).ok_or(Status::DecodingError)?;
        }

        let mut mnemonic = def.mnemonic;
        let mut attrs = attributes::finalize(&state, def);

        apply_aliases(&mut mnemonic, &mut attrs, &mut operands, &state)?;

        if mnemonic == Mnemonic::SWAPGS && self.machine_mode != MachineMode::Long64 {
            return Err(Status::DecodingError);
        }

        let raw_prefixes = copy_prefixes(&state);

        log::trace!(
            "decoded {:?} ({} bytes, encoding {:?}, map {:?})",
            mnemonic,
            state.cursor.length,
            state.encoding,
            state.opcode_map
        );

        Ok(DecodedInstruction {
            mnemonic,
            length: state.cursor.length,
            raw_bytes: state.cursor.raw_bytes,
            machine_mode: self.machine_mode,
            operand_size: state.operand_size,
            address_size: state.address_size,
            encoding: state.encoding,
            opcode_map: state.opcode_map,
            opcode: state.opcode,
            attributes: attrs,
            operands,
            raw_prefixes,
            raw_prefix_count: state.prefixes.as_slice().len(),
            raw_modrm: state.modrm,
            raw_sib: state.sib,
            raw_disp: if state.has_disp { Some(state.disp) } else { None },
            raw_imm: [
                if state.imm_count > 0 { Some(state.imm[0]) } else { None },
                if state.imm_count > 1 { Some(state.imm[1]) } else { None },
            ],
            avx: if minimal { None } else { avx_info },
            category: def.category,
            isa_set: def.isa_set,
            isa_ext: def.isa_ext,
            branch_type: def.branch_type,
            exception_class: def.exception_class,
        })
    }

    /// Returns an iterator that sweeps `buffer` left to right, one decoded
    /// instruction (or error) per item, advancing by `length` on success and
    /// by `1` byte on error (spec.md §4.10's recovery rule).
    pub fn instruction_iterator<'a>(&'a self, buffer: &'a [u8]) -> InstructionIterator<'a> {
        InstructionIterator { decoder: self, buffer, offset: 0 }
    }
}

/// The canonical rewrites applied after a full decode (spec.md §4.7
/// "Aliases").
fn apply_aliases(
    mnemonic: &mut Mnemonic,
    attrs: &mut crate::enums::InstructionAttributes,
    operands: &mut [DecodedOperand; 4],
    state: &DecodeState,
) -> Result<()> {
    use crate::enums::InstructionAttributes;
    use crate::decoder::record::OperandKind;

    if *mnemonic == Mnemonic::XCHG {
        if let (OperandKind::Register(a), OperandKind::Register(b)) = (operands[0].kind, operands[1].kind) {
            let is_acc = |r: Register| matches!(r, Register::EAX | Register::RAX | Register::AX);
            if a == b && is_acc(a) {
                *mnemonic = Mnemonic::NOP;
                *operands = [DecodedOperand::NONE; 4];
            }
        }
    }

    if *mnemonic == Mnemonic::NOP && state.rep {
        *mnemonic = Mnemonic::PAUSE;
        *attrs &= !InstructionAttributes::HAS_REP;
    }

    Ok(())
}

fn copy_prefixes(state: &DecodeState) -> [Option<crate::enums::Prefix>; 15] {
    let mut out = [None; 15];
    for (slot, p) in out.iter_mut().zip(state.prefixes.as_slice().iter()) {
        *slot = *p;
    }
    out
}

/// Sweeps a buffer producing one decode result per instruction, recovering
/// from errors by advancing a single byte (spec.md §4.10), and stopping only
/// once the buffer is exhausted.
pub struct InstructionIterator<'a> {
    decoder: &'a Decoder,
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for InstructionIterator<'a> {
    type Item = core::result::Result<DecodedInstruction, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.buffer.len() {
            return None;
        }
        let result = self.decoder.decode(&self.buffer[self.offset..]);
        match &result {
            Ok(ins) => self.offset += ins.length as usize,
            // `buffer[self.offset..]` is never empty here, so every `Err`
            // carries a `partial` with `length == 1`.
            Err(_) => self.offset += 1,
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::InstructionEncoding;

    #[test]
    fn decodes_nop() {
        let d = Decoder::new(MachineMode::Long64);
        let ins = d.decode(&[0x90]).unwrap();
        assert_eq!(ins.mnemonic, Mnemonic::NOP);
        assert_eq!(ins.length, 1);
    }

    #[test]
    fn decodes_pause() {
        let d = Decoder::new(MachineMode::Long64);
        let ins = d.decode(&[0xF3, 0x90]).unwrap();
        assert_eq!(ins.mnemonic, Mnemonic::PAUSE);
        assert_eq!(ins.length, 2);
    }

    #[test]
    fn decodes_mov_rex_w() {
        // `48 89 D8` -> MOV RAX, RBX
        let d = Decoder::new(MachineMode::Long64);
        let ins = d.decode(&[0x48, 0x89, 0xD8]).unwrap();
        assert_eq!(ins.mnemonic, Mnemonic::MOV);
        assert_eq!(ins.operand_size, 64);
        assert_eq!(ins.length, 3);
    }

    #[test]
    fn decodes_vzeroupper() {
        let d = Decoder::new(MachineMode::Long64);
        let ins = d.decode(&[0xC5, 0xF8, 0x77]).unwrap();
        assert_eq!(ins.mnemonic, Mnemonic::VZEROUPPER);
        assert_eq!(ins.encoding, InstructionEncoding::Vex);
        assert_eq!(ins.length, 3);
        assert_eq!(ins.avx.unwrap().vector_length, 128);
    }

    #[test]
    fn decodes_vaddps_evex_zmm() {
        let d = Decoder::new(MachineMode::Long64);
        let ins = d.decode(&[0x62, 0xF1, 0x7C, 0x48, 0x58, 0xC1]).unwrap();
        assert_eq!(ins.mnemonic, Mnemonic::VADDPS);
        assert_eq!(ins.encoding, InstructionEncoding::Evex);
        assert_eq!(ins.length, 6);
        assert_eq!(ins.avx.unwrap().vector_length, 512);
    }

    #[test]
    fn truncated_ff_recovers_by_one_byte() {
        let d = Decoder::new(MachineMode::Long64);
        let err = d.decode(&[0xFF]).unwrap_err();
        assert_eq!(err.status, Status::EndOfInput);
        let partial = err.partial.unwrap();
        assert_eq!(partial.length, 1);
        assert_eq!(partial.raw_bytes[0], 0xFF);
    }

    #[test]
    fn empty_buffer_is_fatal_with_no_partial() {
        let d = Decoder::new(MachineMode::Long64);
        let err = d.decode(&[]).unwrap_err();
        assert_eq!(err.status, Status::NoMoreData);
        assert!(err.partial.is_none());
    }

    #[test]
    fn iterator_recovers_after_error() {
        let d = Decoder::new(MachineMode::Long64);
        let bytes = [0x0F, 0x05, 0x90]; // SYSCALL, NOP
        let results: Vec<_> = d.instruction_iterator(&bytes).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
    }

    #[test]
    fn threednow_pfrcp() {
        let d = Decoder::new(MachineMode::Long64);
        let ins = d.decode(&[0x0F, 0x0F, 0xC8, 0xBF]).unwrap();
        assert_eq!(ins.mnemonic, Mnemonic::PFRCP);
        assert_eq!(ins.length, 4);
    }
}
