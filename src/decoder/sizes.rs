//! The effective-size resolver (spec.md §4.6).

use crate::enums::MachineMode;

/// Resolves the effective address size from machine mode and the `67`
/// override. Needed before `ModR/M`/`SIB` can be read, so this runs
/// immediately after prefix collection rather than after a definition is
/// matched (address size never depends on which definition matched).
pub fn resolve_address_size(mode: MachineMode, override_present: bool) -> u16 {
    match (mode, override_present) {
        (MachineMode::Long16, false) => 16,
        (MachineMode::Long16, true) => 32,
        (MachineMode::Long32, false) => 32,
        (MachineMode::Long32, true) => 16,
        (MachineMode::Long64, false) => 64,
        (MachineMode::Long64, true) => 32,
    }
}

/// Maps an address size in bits to the 0/1/2 (16/32/64) index used to
/// select eosz/easz-indexed tables.
pub fn size_index(bits: u16) -> usize {
    match bits {
        16 => 0,
        32 => 1,
        64 => 2,
        _ => unreachable!("effective size must be 16/32/64"),
    }
}

/// The six operand-size resolution policies a definition's
/// `operand_size_map` selects between (spec.md §4.6).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OperandSizeMap {
    /// Mode-native width, promoted by `66`/`REX.W` as usual.
    Default,
    /// `66` is ignored; always native mode width.
    IgnoreOperandSizePrefix,
    /// `REX.W` promotes to 32 instead of 64 (used by far `JMP`/`CALL`).
    RexWPromotesTo32,
    /// Defaults to 64-bit in long mode even without `REX.W`.
    DefaultTo64InLongMode,
    /// Always 64-bit in long mode, regardless of any override.
    Forced64InLongMode,
    /// 32-bit unless `REX.W` is set (`MOVSXD` et al.).
    Forced32UnlessRexW,
}

/// Resolves the effective operand size, in bits, given the machine mode,
/// whether `66` was seen, and `REX.W`/`VEX.W`.
pub fn resolve_operand_size(
    map: OperandSizeMap,
    mode: MachineMode,
    operand_size_override: bool,
    rex_w: bool,
) -> u16 {
    use MachineMode::*;
    use OperandSizeMap::*;
    match map {
        Default => match (mode, operand_size_override, rex_w) {
            (_, _, true) => 64,
            (Long16, false, false) => 16,
            (Long16, true, false) => 32,
            (Long32, false, false) => 32,
            (Long32, true, false) => 16,
            (Long64, false, false) => 32,
            (Long64, true, false) => 16,
        },
        IgnoreOperandSizePrefix => match mode {
            Long16 => 16,
            Long32 | Long64 => 32,
        },
        RexWPromotesTo32 => {
            if rex_w {
                32
            } else {
                resolve_operand_size(Default, mode, operand_size_override, false)
            }
        }
        DefaultTo64InLongMode => {
            if mode == Long64 {
                if operand_size_override && !rex_w {
                    16
                } else {
                    64
                }
            } else {
                resolve_operand_size(Default, mode, operand_size_override, rex_w)
            }
        }
        Forced64InLongMode => {
            if mode == Long64 {
                64
            } else {
                resolve_operand_size(Default, mode, operand_size_override, rex_w)
            }
        }
        Forced32UnlessRexW => {
            if rex_w {
                64
            } else {
                32
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_rex_w_wins() {
        assert_eq!(
            resolve_operand_size(OperandSizeMap::Default, MachineMode::Long64, true, true),
            64
        );
    }

    #[test]
    fn forced_32_unless_rex_w() {
        assert_eq!(
            resolve_operand_size(OperandSizeMap::Forced32UnlessRexW, MachineMode::Long64, false, false),
            32
        );
        assert_eq!(
            resolve_operand_size(OperandSizeMap::Forced32UnlessRexW, MachineMode::Long64, false, true),
            64
        );
    }

    #[test]
    fn address_size_overrides() {
        assert_eq!(resolve_address_size(MachineMode::Long64, false), 64);
        assert_eq!(resolve_address_size(MachineMode::Long64, true), 32);
        assert_eq!(resolve_address_size(MachineMode::Long16, true), 32);
    }
}
