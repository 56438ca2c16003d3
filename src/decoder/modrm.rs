//! `ModR/M`, `SIB`, and displacement reading (spec.md §4.5).

use crate::decoder::state::{DecodeState, DispInfo, ModRm, Sib};
use crate::status::Result;

/// Reads and caches `ModR/M`, reading `SIB` and displacement along with it
/// if the addressing form calls for them. A no-op if already cached.
pub fn ensure_modrm(state: &mut DecodeState) -> Result<ModRm> {
    if let Some(m) = state.modrm {
        return Ok(m);
    }
    let offset = state.cursor.position() as u8;
    let byte = state.cursor.next()?;
    let modrm = ModRm { md: byte >> 6, reg: (byte >> 3) & 0x7, rm: byte & 0x7, offset };
    state.modrm = Some(modrm);

    if modrm.md != 3 && state.address_size != 16 && modrm.rm == 4 {
        read_sib(state, modrm)?;
    }
    read_displacement(state, modrm)?;
    Ok(modrm)
}

fn read_sib(state: &mut DecodeState, modrm: ModRm) -> Result<()> {
    let offset = state.cursor.position() as u8;
    let byte = state.cursor.next()?;
    let _ = modrm;
    state.sib = Some(Sib { scale: byte >> 6, index: (byte >> 3) & 0x7, base: byte & 0x7, offset });
    Ok(())
}

fn read_displacement(state: &mut DecodeState, modrm: ModRm) -> Result<()> {
    let size: u8 = if state.address_size == 16 {
        match (modrm.md, modrm.rm) {
            (0, 6) => 16,
            (1, _) => 8,
            (2, _) => 16,
            _ => 0,
        }
    } else {
        let sib_base5 = state.sib.map(|s| s.base == 5).unwrap_or(false);
        match modrm.md {
            0 if modrm.rm == 5 => 32, // RIP-relative in 64-bit, disp32 otherwise
            0 if sib_base5 => 32,
            1 => 8,
            2 => 32,
            _ => 0,
        }
    };

    if size == 0 {
        state.has_disp = false;
        return Ok(());
    }

    let offset = state.cursor.position() as u8;
    let value = state.cursor.next_le(size as usize / 8, true)?;
    state.disp = DispInfo { value, size, offset };
    state.has_disp = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{AddressWidth, MachineMode};

    #[test]
    fn sib_only_when_mod_ne_3_and_rm_4() {
        // mod=00, reg=000, rm=100 (0x04) -> SIB follows; sib byte 0x25 means
        // scale=0, index=100 (none), base=101 -> disp32 forced by base==5.
        let mut s =
            DecodeState::new(&[0x04, 0x25, 0x78, 0x56, 0x34, 0x12], MachineMode::Long64, AddressWidth::Width64);
        s.address_size = 32;
        let m = ensure_modrm(&mut s).unwrap();
        assert_eq!(m.rm, 4);
        assert!(s.sib.is_some());
        assert_eq!(s.disp.value, 0x12345678);
        assert_eq!(s.disp.size, 32);
    }

    #[test]
    fn disp8_sign_extends() {
        let mut s = DecodeState::new(&[0x45, 0xFF], MachineMode::Long64, AddressWidth::Width64);
        s.address_size = 64;
        let m = ensure_modrm(&mut s).unwrap();
        assert_eq!(m.md, 1);
        assert_eq!(s.disp.value, -1);
    }
}
