use thiserror::Error;

use crate::hidden_section::HiddenSectionLayout;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GumballLayoutError {
    #[error("account data too short: needed {needed} bytes, got {actual}")]
    SliceTooShort { needed: usize, actual: usize },
    #[error("invalid bool byte {0}")]
    InvalidBool(u8),
    #[error("invalid option tag {0}")]
    InvalidOptionTag(u8),
    #[error("invalid gumball state {0}")]
    InvalidGumballState(u8),
    #[error("settings uri is not valid utf-8")]
    InvalidUtf8,
    #[error("settings uri is {0} bytes, max is 196")]
    UriTooLong(usize),
    #[error("account discriminator does not match GumballMachine")]
    WrongDiscriminator,
    #[error("account is not owned by the gumball machine program")]
    WrongOwner,
    #[error("{items_loaded} items loaded but capacity is {item_capacity}")]
    ItemsLoadedExceedsCapacity { items_loaded: u32, item_capacity: u64 },
    #[error("header of {header_len} bytes overlaps hidden section at {hidden_section_offset}")]
    HeaderOverflowsHiddenSection {
        header_len: usize,
        hidden_section_offset: usize,
    },
    #[error("version {version} does not use the {layout:?} layout")]
    LayoutMismatch {
        version: u8,
        layout: HiddenSectionLayout,
    },
    #[error("math overflow while sizing the account")]
    MathOverflow,
    #[error("{field} has {len} entries but the item table has {capacity} slots")]
    InconsistentItemTable {
        field: &'static str,
        len: usize,
        capacity: usize,
    },
}

impl GumballLayoutError {
    pub fn code(&self) -> u32 {
        match self {
            Self::SliceTooShort { .. } => 16001,
            Self::InvalidBool(_) => 16002,
            Self::InvalidOptionTag(_) => 16003,
            Self::InvalidGumballState(_) => 16004,
            Self::InvalidUtf8 => 16005,
            Self::UriTooLong(_) => 16006,
            Self::WrongDiscriminator => 16007,
            Self::WrongOwner => 16008,
            Self::ItemsLoadedExceedsCapacity { .. } => 16009,
            Self::HeaderOverflowsHiddenSection { .. } => 16010,
            Self::LayoutMismatch { .. } => 16011,
            Self::MathOverflow => 16012,
            Self::InconsistentItemTable { .. } => 16013,
        }
    }
}

impl From<GumballLayoutError> for u32 {
    fn from(value: GumballLayoutError) -> Self {
        value.code()
    }
}

#[cfg(feature = "pinocchio")]
impl From<GumballLayoutError> for pinocchio::error::ProgramError {
    fn from(value: GumballLayoutError) -> Self {
        pinocchio::error::ProgramError::Custom(value.code())
    }
}
