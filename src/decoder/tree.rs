//! The opcode-tree walker (spec.md §3.4, §4.4): a static n-ary tree whose
//! internal nodes are filters over decoder state and whose leaves reference
//! an instruction definition.

use crate::decoder::escape::{decode as decode_escape, is_escape_gate};
use crate::decoder::modrm::ensure_modrm;
use crate::decoder::state::{DecodeState, MandatoryCandidate};
use crate::enums::{InstructionEncoding, MachineMode, OpcodeMap};
use crate::status::{Result, Status};
use crate::tables::InstructionDef;

/// The predicate kind of an internal tree node (spec.md §3.4/§4.4).
#[derive(Copy, Clone, Debug)]
pub enum FilterKind {
    /// Indexes by the next opcode byte; may trigger a VEX/EVEX/MVEX/XOP
    /// escape at the legal position (§4.3).
    Table,
    Map,
    Mode,
    ModrmMod,
    ModrmReg,
    ModrmRm,
    /// Slot selectors: 0=none, 2=`66`, 3=`F3`, 4=`F2`; falls through to
    /// slot 0 (without consuming the candidate) if the selected slot is
    /// absent.
    MandatoryPrefix,
    VectorLength,
    RexW,
    EvexB,
    EvexZ,
    /// Reads a trailing byte (the "opcode" in the 3DNOW sense) and selects
    /// the final definition by it, after operands have already been
    /// materialized from a placeholder definition (spec.md §4.4).
    ThreeDNow,
}

/// A node in the opcode tree: either a filter with a sparse, selector-keyed
/// child list, or a leaf.
pub enum TreeNode {
    Invalid,
    Leaf(&'static InstructionDef),
    Filter { kind: FilterKind, children: &'static [(u16, TreeNode)] },
}

fn child(children: &[(u16, TreeNode)], selector: u16) -> &TreeNode {
    children
        .iter()
        .find(|(k, _)| *k == selector)
        .map(|(_, n)| n)
        .unwrap_or(&TreeNode::Invalid)
}

/// Outcome of a completed tree walk.
pub struct WalkResult {
    pub def: &'static InstructionDef,
    /// Set for the 3DNOW path: the definition used is a placeholder shared
    /// by every 3DNOW entry, and the real mnemonic is only known after the
    /// trailing opcode byte (read by the caller once operands are done).
    pub needs_trailing_opcode: bool,
}

/// Walks the tree starting at `root`, consuming bytes from `state.cursor`
/// as filters demand them.
pub fn walk(state: &mut DecodeState, root: &'static TreeNode) -> Result<WalkResult> {
    let mut node = root;
    loop {
        match node {
            TreeNode::Invalid => return Err(Status::DecodingError),
            TreeNode::Leaf(def) => {
                return Ok(WalkResult { def, needs_trailing_opcode: false });
            }
            TreeNode::Filter { kind, children } => {
                if matches!(kind, FilterKind::ThreeDNow) {
                    return Ok(WalkResult {
                        def: crate::tables::threednow_sentinel(),
                        needs_trailing_opcode: true,
                    });
                }
                node = step(state, *kind, children)?;
            }
        }
    }
}

fn step<'n>(
    state: &mut DecodeState,
    kind: FilterKind,
    children: &'n [(u16, TreeNode)],
) -> Result<&'n TreeNode> {
    match kind {
        FilterKind::Table => table_step(state, children),
        FilterKind::Map => Ok(child(children, opcode_map_selector(state.opcode_map))),
        FilterKind::Mode => Ok(child(
            children,
            match state.machine_mode {
                MachineMode::Long16 => 0,
                MachineMode::Long32 => 1,
                MachineMode::Long64 => 2,
            },
        )),
        FilterKind::ModrmMod => {
            let m = ensure_modrm(state)?;
            Ok(child(children, m.md as u16))
        }
        FilterKind::ModrmReg => {
            let m = ensure_modrm(state)?;
            Ok(child(children, m.reg as u16))
        }
        FilterKind::ModrmRm => {
            let m = ensure_modrm(state)?;
            Ok(child(children, m.rm as u16))
        }
        FilterKind::MandatoryPrefix => mandatory_prefix_step(state, children),
        FilterKind::VectorLength => {
            if state.vec.ll == 3 {
                return Err(Status::DecodingError);
            }
            Ok(child(children, state.vec.ll as u16))
        }
        FilterKind::RexW => Ok(child(children, state.rex_w() as u16)),
        FilterKind::EvexB => Ok(child(children, state.vec.b_ctx as u16)),
        FilterKind::EvexZ => Ok(child(children, state.vec.z as u16)),
        FilterKind::ThreeDNow => {
            let byte = state.cursor.next()?;
            state.trailing_opcode = Some(byte);
            Ok(child(children, byte as u16))
        }
    }
}

fn opcode_map_selector(map: OpcodeMap) -> u16 {
    match map {
        OpcodeMap::Default => 0,
        OpcodeMap::Map0F => 1,
        OpcodeMap::Map0F38 => 2,
        OpcodeMap::Map0F3A => 3,
        OpcodeMap::Map0F0F => 4,
        OpcodeMap::MapXop8 => 5,
        OpcodeMap::MapXop9 => 6,
        OpcodeMap::MapXopA => 7,
    }
}

fn table_step<'n>(state: &mut DecodeState, children: &'n [(u16, TreeNode)]) -> Result<&'n TreeNode> {
    let byte = state.cursor.peek()?;

    if is_escape_gate(state, byte)? {
        decode_escape(state, byte)?;
        state.opcode = state.cursor.peek()?;
        return Ok(child(children, ESCAPE_SELECTOR));
    }

    state.cursor.next()?;
    state.opcode = byte;

    // The 3DNOW escape is a second `0F` byte following the first `0F`
    // that selected `Map0F`: the caller's tree encodes this as a regular
    // `TABLE` child at byte `0x0F` under the `Map0F` table, switching
    // `opcode_map` before descending into the `ThreeDNow` filter.
    if byte == 0x0F {
        if matches!(state.opcode_map, OpcodeMap::Map0F) {
            state.opcode_map = OpcodeMap::Map0F0F;
            state.encoding = InstructionEncoding::ThreeDNow;
        } else if matches!(state.opcode_map, OpcodeMap::Default) {
            state.opcode_map = OpcodeMap::Map0F;
        }
    }

    Ok(child(children, byte as u16))
}

/// Sentinel selector used by `TABLE` nodes to route to the post-escape
/// subtree (keyed separately from any real opcode byte value).
pub const ESCAPE_SELECTOR: u16 = 0x100;

fn mandatory_prefix_step<'n>(
    state: &mut DecodeState,
    children: &'n [(u16, TreeNode)],
) -> Result<&'n TreeNode> {
    let slot = match state.mandatory_candidate {
        MandatoryCandidate::None => 0,
        MandatoryCandidate::OperandSize => 2,
        MandatoryCandidate::Rep => 3,
        MandatoryCandidate::Repne => 4,
    };

    if slot != 0 {
        let candidate = child(children, slot);
        if !matches!(candidate, TreeNode::Invalid) {
            state.mandatory_candidate = MandatoryCandidate::None;
            return Ok(candidate);
        }
    }
    // Fall through to slot 0 without consuming the candidate (spec.md's
    // normalization of the source's inconsistent behavior, §9).
    Ok(child(children, 0))
}
