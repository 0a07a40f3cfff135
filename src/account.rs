use solana_account::Account;
use tracing::debug;

use crate::{
    anchor_compat::{has_gumball_machine_discriminator, ANCHOR_DISCRIMINATOR_LEN},
    byte_io::ensure_len,
    errors::GumballLayoutError,
    hidden_section::{decode_hidden_section, BuyBackConfig, HiddenSection, HiddenSectionLayout},
    items::{build_items, GumballMachineItem},
    machine_layouts::{GumballMachineHeader, GUMBALL_MACHINE_HIDDEN_SECTION},
    MALLOW_GUMBALL_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Where the hidden section starts. Only differs from the default for
    /// accounts written by a program built with a different settings size.
    pub hidden_section_offset: usize,
    pub verify_discriminator: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            hidden_section_offset: GUMBALL_MACHINE_HIDDEN_SECTION,
            verify_discriminator: true,
        }
    }
}

/// A fully decoded machine: the header, the loaded items, and the version
/// tail upgraded to the newest shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GumballMachineAccount {
    pub header: GumballMachineHeader,
    pub items_loaded: u32,
    pub items: Vec<GumballMachineItem>,
    pub disable_primary_split: bool,
    pub disable_royalties: bool,
    pub buy_back_config: BuyBackConfig,
    pub buy_back_funds_available: u64,
    pub total_proceeds_settled: u64,
}

impl GumballMachineAccount {
    pub fn read_from_account_data(data: &[u8]) -> Result<Self, GumballLayoutError> {
        Self::read_with_options(data, &DecodeOptions::default())
    }

    pub fn read_with_options(
        data: &[u8],
        options: &DecodeOptions,
    ) -> Result<Self, GumballLayoutError> {
        if options.verify_discriminator {
            ensure_len(data, 0, ANCHOR_DISCRIMINATOR_LEN)?;
            if !has_gumball_machine_discriminator(data) {
                return Err(GumballLayoutError::WrongDiscriminator);
            }
        }

        let (header, header_len) = GumballMachineHeader::read_from_account_data(data)?;
        if header_len > options.hidden_section_offset {
            return Err(GumballLayoutError::HeaderOverflowsHiddenSection {
                header_len,
                hidden_section_offset: options.hidden_section_offset,
            });
        }

        let item_capacity = header.settings.item_capacity;
        let layout = HiddenSectionLayout::for_version(header.version);
        let hidden_end = ensure_len(
            data,
            options.hidden_section_offset,
            layout.byte_len(item_capacity)?,
        )?;
        let hidden = decode_hidden_section(
            header.version,
            item_capacity,
            &data[options.hidden_section_offset..hidden_end],
        )?
        .into_canonical();

        let items = build_items(header.items_redeemed, &hidden);
        debug!(
            version = header.version,
            items_loaded = hidden.items.items_loaded,
            items_redeemed = header.items_redeemed,
            "decoded gumball machine"
        );

        Ok(Self {
            items_loaded: hidden.items.items_loaded,
            items,
            disable_primary_split: hidden.flags.disable_primary_split,
            disable_royalties: hidden.flags.disable_royalties,
            buy_back_config: hidden.buy_back.config,
            buy_back_funds_available: hidden.buy_back.funds_available,
            total_proceeds_settled: hidden.total_proceeds_settled,
            header,
        })
    }

    /// Decodes a fetched account, rejecting anything the gumball program
    /// does not own.
    pub fn from_account(account: &Account) -> Result<Self, GumballLayoutError> {
        if account.owner.to_bytes() != MALLOW_GUMBALL_ID.to_bytes() {
            return Err(GumballLayoutError::WrongOwner);
        }
        Self::read_from_account_data(&account.data)
    }

    #[cfg(feature = "pinocchio")]
    pub fn from_account_view(
        account: &pinocchio::AccountView,
    ) -> Result<Self, pinocchio::error::ProgramError> {
        if !account.owned_by(&MALLOW_GUMBALL_ID) {
            return Err(GumballLayoutError::WrongOwner.into());
        }
        let data = account.try_borrow()?;
        Self::read_from_account_data(&data).map_err(Into::into)
    }
}

/// Bytes a machine of `item_capacity` slots occupies at `version`.
pub fn gumball_machine_size(item_capacity: u64, version: u8) -> Result<usize, GumballLayoutError> {
    HiddenSectionLayout::for_version(version)
        .byte_len(item_capacity)?
        .checked_add(GUMBALL_MACHINE_HIDDEN_SECTION)
        .ok_or(GumballLayoutError::MathOverflow)
}

/// Builds the raw data of a machine account. The hidden section must use
/// the layout `header.version` selects and hold `item_capacity` slots.
pub fn encode_account(
    header: &GumballMachineHeader,
    hidden: &HiddenSection,
    options: &DecodeOptions,
) -> Result<Vec<u8>, GumballLayoutError> {
    let layout = HiddenSectionLayout::for_version(header.version);
    if hidden.layout() != layout {
        return Err(GumballLayoutError::LayoutMismatch {
            version: header.version,
            layout: hidden.layout(),
        });
    }
    let item_capacity = header.settings.item_capacity;
    if hidden.capacity() as u64 != item_capacity {
        return Err(GumballLayoutError::InconsistentItemTable {
            field: "config_lines",
            len: hidden.capacity(),
            capacity: usize::try_from(item_capacity).map_err(|_| GumballLayoutError::MathOverflow)?,
        });
    }

    let len = options
        .hidden_section_offset
        .checked_add(layout.byte_len(item_capacity)?)
        .ok_or(GumballLayoutError::MathOverflow)?;
    let mut data = vec![0u8; len];

    let header_len = header.write_to_account_data(&mut data)?;
    if header_len > options.hidden_section_offset {
        return Err(GumballLayoutError::HeaderOverflowsHiddenSection {
            header_len,
            hidden_section_offset: options.hidden_section_offset,
        });
    }
    hidden.write_to_slice(&mut data[options.hidden_section_offset..])?;
    Ok(data)
}
