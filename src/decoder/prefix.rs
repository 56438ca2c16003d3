//! The legacy prefix collector (spec.md §4.2).

use crate::decoder::state::{DecodeState, MandatoryCandidate};
use crate::enums::{MachineMode, Prefix, PrefixType, Register};
use crate::status::{Result, Status};

/// Scans legacy prefix bytes until a non-prefix byte is peeked. Returns once
/// the cursor sits at what should be interpreted as the opcode byte (or an
/// escape byte).
pub fn collect(state: &mut DecodeState) -> Result<()> {
    loop {
        let byte = match state.cursor.peek() {
            Ok(b) => b,
            Err(Status::EndOfInput) => return Ok(()),
            Err(e) => return Err(e),
        };

        match byte {
            0xF0 => {
                state.cursor.next()?;
                state.lock = true;
                state.prefixes.push(Prefix { ty: PrefixType::Lock, value: byte });
            }
            0xF2 => {
                state.cursor.next()?;
                state.repne = true;
                if state.mandatory_candidate != MandatoryCandidate::OperandSize {
                    state.mandatory_candidate = MandatoryCandidate::Repne;
                }
                state.prefixes.push(Prefix { ty: PrefixType::Repne, value: byte });
            }
            0xF3 => {
                state.cursor.next()?;
                state.rep = true;
                if state.mandatory_candidate != MandatoryCandidate::OperandSize {
                    state.mandatory_candidate = MandatoryCandidate::Rep;
                }
                state.prefixes.push(Prefix { ty: PrefixType::Rep, value: byte });
            }
            0x2E | 0x36 | 0x3E | 0x26 | 0x64 | 0x65 => {
                state.cursor.next()?;
                let seg = match byte {
                    0x2E => Register::CS,
                    0x36 => Register::SS,
                    0x3E => Register::DS,
                    0x26 => Register::ES,
                    0x64 => Register::FS,
                    0x65 => Register::GS,
                    _ => unreachable!(),
                };
                state.last_segment_prefix = Some(seg);
                state.prefixes.push(Prefix { ty: PrefixType::Segment, value: byte });
            }
            0x66 => {
                state.cursor.next()?;
                state.operand_size_override = true;
                state.mandatory_candidate = MandatoryCandidate::OperandSize;
                state.prefixes.push(Prefix { ty: PrefixType::OperandSize, value: byte });
            }
            0x67 => {
                state.cursor.next()?;
                state.address_size_override = true;
                state.prefixes.push(Prefix { ty: PrefixType::AddressSize, value: byte });
            }
            0x40..=0x4F if state.machine_mode == MachineMode::Long64 => {
                state.cursor.next()?;
                state.rex_present = true;
                state.rex_byte = byte;
                state.prefixes.push(Prefix { ty: PrefixType::Rex, value: byte });
            }
            _ => return Ok(()),
        }

        state.prefix_count += 1;

        // Only a REX byte immediately followed by the opcode counts: a
        // further legacy prefix after REX un-does its effect on opcode
        // extension (spec.md §4.2 "Rules").
        if state.rex_present && !(0x40..=0x4F).contains(&byte) {
            state.rex_present = false;
            state.rex_byte = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::AddressWidth;

    fn state(bytes: &[u8]) -> DecodeState<'_> {
        DecodeState::new(bytes, MachineMode::Long64, AddressWidth::Width64)
    }

    #[test]
    fn rex_must_be_last() {
        let mut s = state(&[0x66, 0x48, 0x66, 0x90]);
        collect(&mut s).unwrap();
        // 0x48 (REX.W) was shadowed by the trailing 0x66, so it no longer
        // counts as an active REX prefix.
        assert!(!s.rex_present);
        assert_eq!(s.cursor.peek().unwrap(), 0x90);
    }

    #[test]
    fn mandatory_candidate_priority() {
        let mut s = state(&[0xF2, 0x66, 0x0F]);
        collect(&mut s).unwrap();
        assert_eq!(s.mandatory_candidate, MandatoryCandidate::OperandSize);
    }

    #[test]
    fn segment_prefix_last_wins() {
        let mut s = state(&[0x2E, 0x64, 0x90]);
        collect(&mut s).unwrap();
        assert_eq!(s.last_segment_prefix, Some(Register::FS));
    }
}
