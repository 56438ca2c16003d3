//! VEX/EVEX/MVEX/XOP escape-prefix decoding (spec.md §4.3).

use crate::decoder::state::{DecodeState, MandatoryCandidate};
use crate::enums::{InstructionEncoding, MachineMode, OpcodeMap};
use crate::status::{Result, Status};

/// Whether the byte at the current cursor position is an escape byte that
/// should actually be interpreted as one, per the two gate conditions in
/// spec.md §4.3.
pub fn is_escape_gate(state: &DecodeState, byte: u8) -> Result<bool> {
    if !matches!(byte, 0xC4 | 0xC5 | 0x62 | 0x8F) {
        return Ok(false);
    }
    if state.machine_mode == MachineMode::Long64 {
        return Ok(true);
    }
    // In 16/32-bit mode, only escape if the following byte looks like a
    // `mod=11` ModRM (top two bits set); otherwise this is a legacy opcode
    // (LES/LDS/BOUND/POP).
    match state.cursor.peek_at(1) {
        Ok(next) => Ok(next & 0xC0 == 0xC0),
        Err(Status::EndOfInput) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Decodes the escape sequence starting at the given lead byte (already
/// peeked, not yet consumed). Requires no mandatory-prefix candidate and no
/// shadowed `REX` to have been seen (spec.md §4.2 hard errors).
pub fn decode(state: &mut DecodeState, lead: u8) -> Result<()> {
    if state.mandatory_candidate != MandatoryCandidate::None {
        return Err(Status::IllegalLegacyPfx);
    }
    if state.rex_present && lead != 0 {
        // A REX byte is only legal if it is the last legacy prefix before
        // the opcode; reaching an escape means a REX was collected but is
        // about to be shadowed by VEX/EVEX/MVEX/XOP, which is illegal.
        return Err(Status::IllegalRex);
    }

    state.cursor.next()?; // consume lead byte

    match lead {
        0xC5 => decode_vex2(state),
        0xC4 => decode_vex3(state),
        0x62 => decode_evex_or_mvex(state),
        0x8F => decode_xop(state),
        _ => unreachable!(),
    }
}

fn decode_vex2(state: &mut DecodeState) -> Result<()> {
    let b1 = state.cursor.next()?;
    state.encoding = InstructionEncoding::Vex;
    state.opcode_map = OpcodeMap::Map0F;
    state.vec.r = 1 - ((b1 >> 7) & 1);
    state.vec.x = 1;
    state.vec.b = 1;
    state.vec.w = 0;
    state.vec.vvvv = !(b1 >> 3) & 0xF;
    state.vec.ll = (b1 >> 2) & 1;
    state.vec.pp = b1 & 0x3;
    apply_pp_as_mandatory(state);
    Ok(())
}

fn decode_vex3(state: &mut DecodeState) -> Result<()> {
    let b1 = state.cursor.next()?;
    let b2 = state.cursor.next()?;
    state.encoding = InstructionEncoding::Vex;
    let mmmm = b1 & 0x1F;
    state.opcode_map = map_from_vex_mmmm(mmmm)?;
    state.vec.r = 1 - ((b1 >> 7) & 1);
    state.vec.x = 1 - ((b1 >> 6) & 1);
    state.vec.b = 1 - ((b1 >> 5) & 1);
    state.vec.w = (b2 >> 7) & 1;
    state.vec.vvvv = !(b2 >> 3) & 0xF;
    state.vec.ll = (b2 >> 2) & 1;
    state.vec.pp = b2 & 0x3;
    apply_pp_as_mandatory(state);
    Ok(())
}

fn map_from_vex_mmmm(mmmm: u8) -> Result<OpcodeMap> {
    match mmmm {
        1 => Ok(OpcodeMap::Map0F),
        2 => Ok(OpcodeMap::Map0F38),
        3 => Ok(OpcodeMap::Map0F3A),
        0 => Ok(OpcodeMap::Default),
        _ => Err(Status::InvalidMap),
    }
}

fn decode_xop(state: &mut DecodeState) -> Result<()> {
    let b1 = state.cursor.next()?;
    if b1 & 0x1F < 8 {
        return Err(Status::InvalidMap);
    }
    let b2 = state.cursor.next()?;
    state.encoding = InstructionEncoding::Xop;
    state.opcode_map = match b1 & 0x1F {
        8 => OpcodeMap::MapXop8,
        9 => OpcodeMap::MapXop9,
        0xA => OpcodeMap::MapXopA,
        _ => return Err(Status::InvalidMap),
    };
    state.vec.r = 1 - ((b1 >> 7) & 1);
    state.vec.x = 1 - ((b1 >> 6) & 1);
    state.vec.b = 1 - ((b1 >> 5) & 1);
    state.vec.w = (b2 >> 7) & 1;
    state.vec.vvvv = !(b2 >> 3) & 0xF;
    state.vec.ll = (b2 >> 2) & 1;
    state.vec.pp = b2 & 0x3;
    apply_pp_as_mandatory(state);
    Ok(())
}

fn decode_evex_or_mvex(state: &mut DecodeState) -> Result<()> {
    let b1 = state.cursor.next()?;
    let b2 = state.cursor.next()?;
    let b3 = state.cursor.next()?;

    let mm = b1 & 0x3;
    if mm > 3 {
        return Err(Status::InvalidMap);
    }
    state.opcode_map = match mm {
        1 => OpcodeMap::Map0F,
        2 => OpcodeMap::Map0F38,
        3 => OpcodeMap::Map0F3A,
        _ => return Err(Status::InvalidMap),
    };

    state.vec.r = 1 - ((b1 >> 7) & 1);
    state.vec.x = 1 - ((b1 >> 6) & 1);
    state.vec.b = 1 - ((b1 >> 5) & 1);
    state.vec.r2 = 1 - ((b1 >> 4) & 1);
    state.vec.w = (b2 >> 7) & 1;
    state.vec.vvvv = !(b2 >> 3) & 0xF;
    state.vec.pp = b2 & 0x3;

    if (b2 >> 2) & 1 == 1 {
        // EVEX: reserved bits [3:2] of the first trailing byte must be 00.
        if (b1 >> 2) & 0x3 != 0 {
            return Err(Status::MalformedEvex);
        }
        state.encoding = InstructionEncoding::Evex;
        state.vec.z = (b3 >> 7) & 1;
        let l2 = (b3 >> 6) & 1;
        let l = (b3 >> 5) & 1;
        state.vec.ll = (l2 << 1) | l;
        state.vec.b_ctx = (b3 >> 4) & 1;
        state.vec.v2 = 1 - ((b3 >> 3) & 1);
        state.vec.aaa = b3 & 0x7;
    } else {
        state.encoding = InstructionEncoding::Mvex;
        state.vec.e = (b3 >> 4) & 1;
        state.vec.sss = (b3 >> 1) & 0x7;
        state.vec.v2 = 1 - ((b3 >> 3) & 1);
        state.vec.aaa = b3 & 0x7;
    }
    apply_pp_as_mandatory(state);
    Ok(())
}

/// `VEX.pp`/`XOP.pp`/`EVEX.pp` encode the same role as a legacy mandatory
/// prefix; record it so the tree walker's `MANDATORY_PREFIX` filter can
/// treat both uniformly.
fn apply_pp_as_mandatory(state: &mut DecodeState) {
    state.mandatory_candidate = match state.vec.pp {
        1 => MandatoryCandidate::OperandSize,
        2 => MandatoryCandidate::Rep,
        3 => MandatoryCandidate::Repne,
        _ => MandatoryCandidate::None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::AddressWidth;

    #[test]
    fn vex2_canonicalizes_inverted_bits() {
        // `C5 F8` is the VZEROUPPER lead-in (spec.md §8 #5): R inverted to 0,
        // vvvv inverted to 0 (no NDS register), L=0 (128-bit).
        let mut s = DecodeState::new(&[0xF8], MachineMode::Long64, AddressWidth::Width64);
        decode_vex2(&mut s).unwrap();
        assert_eq!(s.vec.ll, 0);
        assert_eq!(s.vec.r, 0);
        assert_eq!(s.vec.vvvv, 0);
        assert_eq!(s.vec.x, 1);
        assert_eq!(s.vec.b, 1);
    }

    #[test]
    fn evex_rejects_reserved_bits() {
        let mut s =
            DecodeState::new(&[0x7D, 0x7C, 0xFF], MachineMode::Long64, AddressWidth::Width64);
        // b1 = 0x7D has bits[3:2] = 0b11, which must be zero for EVEX.
        assert_eq!(decode_evex_or_mvex(&mut s), Err(Status::MalformedEvex));
    }

    #[test]
    fn evex_scenario_vaddps_zmm() {
        // `62 F1 7C 48 58 C1` — VADDPS zmm0, zmm0, zmm1 (spec.md §8 #6).
        let mut s =
            DecodeState::new(&[0xF1, 0x7C, 0x48], MachineMode::Long64, AddressWidth::Width64);
        decode_evex_or_mvex(&mut s).unwrap();
        assert_eq!(s.encoding, InstructionEncoding::Evex);
        assert_eq!(s.vec.ll, 0b10);
        assert_eq!(s.vec.w, 0);
        assert_eq!(s.vec.r, 0);
        assert_eq!(s.vec.vvvv, 0);
    }
}
