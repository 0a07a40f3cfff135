//! Packed slot bitmaps (claimed / settled).
//!
//! The program reserves `slots / 8 + 1` bytes per map, one byte more than
//! needed when `slots` is a multiple of 8. Slot `i` is stored in byte
//! `i / 8` under mask `1 << (7 - i % 8)`.

use crate::{
    byte_io::{ensure_len, write_bytes},
    errors::GumballLayoutError,
};

/// Bytes the program reserves for a bitmap over `slots` slots.
pub const fn bit_map_len(slots: usize) -> usize {
    slots / 8 + 1
}

#[inline]
fn slot_mask(index: usize) -> u8 {
    1u8 << (7 - (index % 8))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitView<'a> {
    bytes: &'a [u8],
}

impl<'a> BitView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Borrows the bitmap for `slots` slots at `offset` and advances past it.
    pub fn read(
        data: &'a [u8],
        offset: &mut usize,
        slots: usize,
    ) -> Result<Self, GumballLayoutError> {
        let end = ensure_len(data, *offset, bit_map_len(slots))?;
        let view = Self::new(&data[*offset..end]);
        *offset = end;
        Ok(view)
    }

    /// Out-of-range slots read as unset.
    pub fn get(&self, index: usize) -> bool {
        self.bytes
            .get(index / 8)
            .is_some_and(|byte| byte & slot_mask(index) != 0)
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn to_vec(&self, slots: usize) -> Vec<bool> {
        (0..slots).map(|index| self.get(index)).collect()
    }
}

/// Decodes a `slots`-long bitmap from the start of `data`.
pub fn decode_bit_array(data: &[u8], slots: usize) -> Result<Vec<bool>, GumballLayoutError> {
    let mut offset = 0usize;
    Ok(BitView::read(data, &mut offset, slots)?.to_vec(slots))
}

/// Writes `bits` as a `bits.len()`-slot bitmap, padding bytes included.
pub(crate) fn write_bit_array(
    data: &mut [u8],
    offset: &mut usize,
    bits: &[bool],
) -> Result<(), GumballLayoutError> {
    let mut packed = vec![0u8; bit_map_len(bits.len())];
    for (index, _) in bits.iter().enumerate().filter(|(_, set)| **set) {
        packed[index / 8] |= slot_mask(index);
    }
    write_bytes(data, offset, &packed)
}
