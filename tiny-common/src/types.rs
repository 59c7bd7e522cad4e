//! Common types used throughout the compiler
//!
//! This module defines the variable slot model shared by validation and
//! code generation. Variables `A`..`Z` each own one 8-byte cell below the
//! frame base; there is no scoping, so a letter always maps to the same cell.

use crate::error::CompilerError;

/// Label identifier for code generation
pub type LabelId = u32;

/// Number of variable slots (one per uppercase letter)
pub const NUM_VARIABLES: usize = 26;

/// Size of a variable slot in bytes
pub const SLOT_SIZE: u32 = 8;

/// Size of the whole variable area in bytes
pub const FRAME_SIZE: u32 = NUM_VARIABLES as u32 * SLOT_SIZE;

/// A validated variable slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarSlot(char);

impl VarSlot {
    /// Create a slot for a variable name, rejecting anything outside `A`..`Z`
    pub fn new(name: char) -> Result<Self, CompilerError> {
        if name.is_ascii_uppercase() {
            Ok(VarSlot(name))
        } else {
            Err(CompilerError::InvalidVariable { name })
        }
    }

    /// Zero-based slot index (`A` is 0)
    pub fn index(&self) -> usize {
        (self.0 as u8 - b'A') as usize
    }

    /// Distance in bytes below the frame base (`A` is 8, `B` is 16, ...)
    pub fn frame_offset(&self) -> u32 {
        SLOT_SIZE * (self.index() as u32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_offsets() {
        assert_eq!(VarSlot::new('A').unwrap().frame_offset(), 8);
        assert_eq!(VarSlot::new('B').unwrap().frame_offset(), 16);
        assert_eq!(VarSlot::new('Z').unwrap().frame_offset(), 208);
        assert_eq!(VarSlot::new('Z').unwrap().index(), 25);
    }

    #[test]
    fn test_last_slot_fits_in_frame() {
        let z = VarSlot::new('Z').unwrap();
        assert_eq!(z.frame_offset(), FRAME_SIZE);
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(
            VarSlot::new('a'),
            Err(CompilerError::InvalidVariable { name: 'a' })
        );
        assert!(VarSlot::new('1').is_err());
        assert!(VarSlot::new('Ä').is_err());
    }
}
