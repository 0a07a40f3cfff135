//! Little-endian cursor readers and writers shared by the account layouts.
//!
//! Every reader takes the buffer and a running `offset`, checks the bounds,
//! and advances the offset only on success.

use crate::errors::GumballLayoutError;

pub const PUBKEY_LEN: usize = 32;

pub(crate) fn ensure_len(
    data: &[u8],
    offset: usize,
    len: usize,
) -> Result<usize, GumballLayoutError> {
    let end = offset.checked_add(len).ok_or(GumballLayoutError::MathOverflow)?;
    if data.len() < end {
        return Err(GumballLayoutError::SliceTooShort {
            needed: end,
            actual: data.len(),
        });
    }
    Ok(end)
}

pub(crate) fn read_fixed<const N: usize>(
    data: &[u8],
    offset: &mut usize,
) -> Result<[u8; N], GumballLayoutError> {
    let end = ensure_len(data, *offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&data[*offset..end]);
    *offset = end;
    Ok(out)
}

pub(crate) fn read_pubkey(
    data: &[u8],
    offset: &mut usize,
) -> Result<[u8; PUBKEY_LEN], GumballLayoutError> {
    read_fixed::<PUBKEY_LEN>(data, offset)
}

pub(crate) fn read_u8(data: &[u8], offset: &mut usize) -> Result<u8, GumballLayoutError> {
    let end = ensure_len(data, *offset, 1)?;
    let out = data[*offset];
    *offset = end;
    Ok(out)
}

pub(crate) fn read_bool(data: &[u8], offset: &mut usize) -> Result<bool, GumballLayoutError> {
    match read_u8(data, offset)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(GumballLayoutError::InvalidBool(other)),
    }
}

/// Raw flag byte read the way the program reads it: only `1` is set.
pub(crate) fn read_flag(data: &[u8], offset: &mut usize) -> Result<bool, GumballLayoutError> {
    Ok(read_u8(data, offset)? == 1)
}

/// Reads a Borsh `Option` tag, returning whether a value follows.
pub(crate) fn read_option_tag(
    data: &[u8],
    offset: &mut usize,
) -> Result<bool, GumballLayoutError> {
    match read_u8(data, offset)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(GumballLayoutError::InvalidOptionTag(other)),
    }
}

pub(crate) fn read_u16(data: &[u8], offset: &mut usize) -> Result<u16, GumballLayoutError> {
    read_fixed::<2>(data, offset).map(u16::from_le_bytes)
}

pub(crate) fn read_u32(data: &[u8], offset: &mut usize) -> Result<u32, GumballLayoutError> {
    read_fixed::<4>(data, offset).map(u32::from_le_bytes)
}

pub(crate) fn read_u64(data: &[u8], offset: &mut usize) -> Result<u64, GumballLayoutError> {
    read_fixed::<8>(data, offset).map(u64::from_le_bytes)
}

/// Borsh string: `u32` byte length followed by UTF-8.
pub(crate) fn read_string(data: &[u8], offset: &mut usize) -> Result<String, GumballLayoutError> {
    let len = read_u32(data, offset)? as usize;
    let end = ensure_len(data, *offset, len)?;
    let out = core::str::from_utf8(&data[*offset..end])
        .map_err(|_| GumballLayoutError::InvalidUtf8)?
        .to_owned();
    *offset = end;
    Ok(out)
}

pub(crate) fn write_bytes(
    data: &mut [u8],
    offset: &mut usize,
    value: &[u8],
) -> Result<(), GumballLayoutError> {
    let end = ensure_len(data, *offset, value.len())?;
    data[*offset..end].copy_from_slice(value);
    *offset = end;
    Ok(())
}

pub(crate) fn write_u8(
    data: &mut [u8],
    offset: &mut usize,
    value: u8,
) -> Result<(), GumballLayoutError> {
    write_bytes(data, offset, &[value])
}

pub(crate) fn write_bool(
    data: &mut [u8],
    offset: &mut usize,
    value: bool,
) -> Result<(), GumballLayoutError> {
    write_u8(data, offset, value as u8)
}

pub(crate) fn write_u16(
    data: &mut [u8],
    offset: &mut usize,
    value: u16,
) -> Result<(), GumballLayoutError> {
    write_bytes(data, offset, &value.to_le_bytes())
}

pub(crate) fn write_u32(
    data: &mut [u8],
    offset: &mut usize,
    value: u32,
) -> Result<(), GumballLayoutError> {
    write_bytes(data, offset, &value.to_le_bytes())
}

pub(crate) fn write_u64(
    data: &mut [u8],
    offset: &mut usize,
    value: u64,
) -> Result<(), GumballLayoutError> {
    write_bytes(data, offset, &value.to_le_bytes())
}

pub(crate) fn write_string(
    data: &mut [u8],
    offset: &mut usize,
    value: &str,
) -> Result<(), GumballLayoutError> {
    let len = u32::try_from(value.len()).map_err(|_| GumballLayoutError::MathOverflow)?;
    write_u32(data, offset, len)?;
    write_bytes(data, offset, value.as_bytes())
}
