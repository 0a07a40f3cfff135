//! The variable-length tail of a `GumballMachine` account.
//!
//! Layout, starting at `GUMBALL_MACHINE_HIDDEN_SECTION`:
//!
//! - (u32) items loaded
//! - (config line * item_capacity), 97 bytes per line before v2, 105 after
//! - (item_capacity / 8) + 1 bytes, claimed bitmap
//! - (item_capacity / 8) + 1 bytes, settled bitmap
//! - (u32 * item_capacity) indices of items left to draw
//!
//! - v3: (bool) disable_royalties, ([u8; 3]) unused, (bool) disable_primary_split
//! - v4: (BuyBackConfig) buy_back_config, (u64) buy_back_funds_available
//! - v5: (u64) total_proceeds_settled

use tracing::debug;

use crate::{
    bit_view::{bit_map_len, write_bit_array, BitView},
    byte_io::{
        ensure_len, read_bool, read_fixed, read_flag, read_pubkey, read_u16, read_u32, read_u64,
        read_u8, write_bool, write_bytes, write_u16, write_u32, write_u64, write_u8, PUBKEY_LEN,
    },
    errors::GumballLayoutError,
};

pub const CONFIG_LINE_LEN: usize = PUBKEY_LEN * 3 + 1;
pub const CONFIG_LINE_V2_LEN: usize = CONFIG_LINE_LEN + 8;
pub const BUY_BACK_CONFIG_LEN: usize = 1 + 1 + PUBKEY_LEN + 1 + 2 + 1;
pub const SALE_FLAGS_LEN: usize = 1 + 3 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenStandard {
    #[default]
    NonFungible,
    Core,
    Fungible,
    ProgrammableNonFungible,
    /// A tag this client does not know. Unloaded slots may hold anything.
    Unknown(u8),
}

impl TokenStandard {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NonFungible,
            1 => Self::Core,
            2 => Self::Fungible,
            3 => Self::ProgrammableNonFungible,
            other => Self::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::NonFungible => 0,
            Self::Core => 1,
            Self::Fungible => 2,
            Self::ProgrammableNonFungible => 3,
            Self::Unknown(other) => other,
        }
    }
}

/// Asset slot as stored by v0 and v1 machines, which only held NFTs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigLine {
    pub mint: [u8; PUBKEY_LEN],
    /// Wallet that submitted the asset.
    pub seller: [u8; PUBKEY_LEN],
    /// Wallet that receives the asset. Zero until drawn.
    pub buyer: [u8; PUBKEY_LEN],
    pub token_standard: TokenStandard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigLineV2 {
    pub mint: [u8; PUBKEY_LEN],
    pub seller: [u8; PUBKEY_LEN],
    pub buyer: [u8; PUBKEY_LEN],
    pub token_standard: TokenStandard,
    pub amount: u64,
}

impl From<ConfigLine> for ConfigLineV2 {
    fn from(line: ConfigLine) -> Self {
        Self {
            mint: line.mint,
            seller: line.seller,
            buyer: line.buyer,
            token_standard: line.token_standard,
            amount: 1,
        }
    }
}

/// Fixed-width record stored once per slot.
pub trait ConfigLineLayout: Sized {
    const LEN: usize;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self, GumballLayoutError>;

    fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<(), GumballLayoutError>;
}

impl ConfigLineLayout for ConfigLine {
    const LEN: usize = CONFIG_LINE_LEN;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self, GumballLayoutError> {
        Ok(Self {
            mint: read_pubkey(data, offset)?,
            seller: read_pubkey(data, offset)?,
            buyer: read_pubkey(data, offset)?,
            token_standard: TokenStandard::from_u8(read_u8(data, offset)?),
        })
    }

    fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<(), GumballLayoutError> {
        write_bytes(data, offset, &self.mint)?;
        write_bytes(data, offset, &self.seller)?;
        write_bytes(data, offset, &self.buyer)?;
        write_u8(data, offset, self.token_standard.as_u8())
    }
}

impl ConfigLineLayout for ConfigLineV2 {
    const LEN: usize = CONFIG_LINE_V2_LEN;

    fn read(data: &[u8], offset: &mut usize) -> Result<Self, GumballLayoutError> {
        Ok(Self {
            mint: read_pubkey(data, offset)?,
            seller: read_pubkey(data, offset)?,
            buyer: read_pubkey(data, offset)?,
            token_standard: TokenStandard::from_u8(read_u8(data, offset)?),
            amount: read_u64(data, offset)?,
        })
    }

    fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<(), GumballLayoutError> {
        write_bytes(data, offset, &self.mint)?;
        write_bytes(data, offset, &self.seller)?;
        write_bytes(data, offset, &self.buyer)?;
        write_u8(data, offset, self.token_standard.as_u8())?;
        write_u64(data, offset, self.amount)
    }
}

/// Reads exactly `count` v0/v1 lines starting at `offset`.
pub fn decode_config_lines(
    data: &[u8],
    offset: &mut usize,
    count: usize,
) -> Result<Vec<ConfigLine>, GumballLayoutError> {
    read_config_lines(data, offset, count)
}

/// Reads exactly `count` v2+ lines starting at `offset`.
pub fn decode_config_lines_v2(
    data: &[u8],
    offset: &mut usize,
    count: usize,
) -> Result<Vec<ConfigLineV2>, GumballLayoutError> {
    read_config_lines(data, offset, count)
}

// Every capacity slot is physically present, loaded or not.
fn read_config_lines<L: ConfigLineLayout>(
    data: &[u8],
    offset: &mut usize,
    count: usize,
) -> Result<Vec<L>, GumballLayoutError> {
    let span = count
        .checked_mul(L::LEN)
        .ok_or(GumballLayoutError::MathOverflow)?;
    ensure_len(data, *offset, span)?;

    let mut lines = Vec::with_capacity(count);
    for _ in 0..count {
        lines.push(L::read(data, offset)?);
    }
    Ok(lines)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuyBackConfig {
    pub enabled: bool,
    /// Bought-back prizes go back into the machine (not yet supported on-chain).
    pub to_gumball_machine: bool,
    /// Must sign buy backs so pricing is correct.
    pub oracle_signer: [u8; PUBKEY_LEN],
    /// Percentage of prize value paid when buying back.
    pub value_pct: u8,
    pub marketplace_fee_bps: u16,
    /// Buy back is disabled once the remaining percentage is at or below this.
    pub cutoff_pct: u8,
}

impl BuyBackConfig {
    fn read(data: &[u8], offset: &mut usize) -> Result<Self, GumballLayoutError> {
        Ok(Self {
            enabled: read_bool(data, offset)?,
            to_gumball_machine: read_bool(data, offset)?,
            oracle_signer: read_pubkey(data, offset)?,
            value_pct: read_u8(data, offset)?,
            marketplace_fee_bps: read_u16(data, offset)?,
            cutoff_pct: read_u8(data, offset)?,
        })
    }

    fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<(), GumballLayoutError> {
        write_bool(data, offset, self.enabled)?;
        write_bool(data, offset, self.to_gumball_machine)?;
        write_bytes(data, offset, &self.oracle_signer)?;
        write_u8(data, offset, self.value_pct)?;
        write_u16(data, offset, self.marketplace_fee_bps)?;
        write_u8(data, offset, self.cutoff_pct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaleFlags {
    pub disable_royalties: bool,
    pub unused: [u8; 3],
    pub disable_primary_split: bool,
}

impl SaleFlags {
    fn read(data: &[u8], offset: &mut usize) -> Result<Self, GumballLayoutError> {
        Ok(Self {
            disable_royalties: read_flag(data, offset)?,
            unused: read_fixed::<3>(data, offset)?,
            disable_primary_split: read_flag(data, offset)?,
        })
    }

    fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<(), GumballLayoutError> {
        write_bool(data, offset, self.disable_royalties)?;
        write_bytes(data, offset, &self.unused)?;
        write_bool(data, offset, self.disable_primary_split)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuyBackState {
    pub config: BuyBackConfig,
    pub funds_available: u64,
}

impl BuyBackState {
    fn read(data: &[u8], offset: &mut usize) -> Result<Self, GumballLayoutError> {
        Ok(Self {
            config: BuyBackConfig::read(data, offset)?,
            funds_available: read_u64(data, offset)?,
        })
    }

    fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<(), GumballLayoutError> {
        self.config.write(data, offset)?;
        write_u64(data, offset, self.funds_available)
    }
}

/// The per-slot arrays shared by every layout. All four vectors hold one
/// entry per capacity slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemTable<L> {
    pub items_loaded: u32,
    pub config_lines: Vec<L>,
    pub items_claimed_map: Vec<bool>,
    pub items_settled_map: Vec<bool>,
    /// Slots not yet drawn; only the first `items_loaded - items_redeemed`
    /// entries are live.
    pub items_left_to_mint: Vec<u32>,
}

impl<L: ConfigLineLayout> ItemTable<L> {
    pub fn capacity(&self) -> usize {
        self.config_lines.len()
    }

    fn read(data: &[u8], offset: &mut usize, capacity: usize) -> Result<Self, GumballLayoutError> {
        let items_loaded = read_u32(data, offset)?;
        if items_loaded as usize > capacity {
            return Err(GumballLayoutError::ItemsLoadedExceedsCapacity {
                items_loaded,
                item_capacity: capacity as u64,
            });
        }

        let config_lines = read_config_lines::<L>(data, offset, capacity)?;
        let items_claimed_map = BitView::read(data, offset, capacity)?.to_vec(capacity);
        let items_settled_map = BitView::read(data, offset, capacity)?.to_vec(capacity);

        let indices_len = capacity
            .checked_mul(4)
            .ok_or(GumballLayoutError::MathOverflow)?;
        ensure_len(data, *offset, indices_len)?;
        let mut items_left_to_mint = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            items_left_to_mint.push(read_u32(data, offset)?);
        }

        Ok(Self {
            items_loaded,
            config_lines,
            items_claimed_map,
            items_settled_map,
            items_left_to_mint,
        })
    }

    fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<(), GumballLayoutError> {
        let capacity = self.capacity();
        if self.items_loaded as usize > capacity {
            return Err(GumballLayoutError::ItemsLoadedExceedsCapacity {
                items_loaded: self.items_loaded,
                item_capacity: capacity as u64,
            });
        }
        for (field, len) in [
            ("items_claimed_map", self.items_claimed_map.len()),
            ("items_settled_map", self.items_settled_map.len()),
            ("items_left_to_mint", self.items_left_to_mint.len()),
        ] {
            if len != capacity {
                return Err(GumballLayoutError::InconsistentItemTable {
                    field,
                    len,
                    capacity,
                });
            }
        }

        write_u32(data, offset, self.items_loaded)?;
        for line in &self.config_lines {
            line.write(data, offset)?;
        }
        write_bit_array(data, offset, &self.items_claimed_map)?;
        write_bit_array(data, offset, &self.items_settled_map)?;
        for index in &self.items_left_to_mint {
            write_u32(data, offset, *index)?;
        }
        Ok(())
    }
}

impl<L> ItemTable<L> {
    pub fn map_lines<M>(self, f: impl FnMut(L) -> M) -> ItemTable<M> {
        ItemTable {
            items_loaded: self.items_loaded,
            config_lines: self.config_lines.into_iter().map(f).collect(),
            items_claimed_map: self.items_claimed_map,
            items_settled_map: self.items_settled_map,
            items_left_to_mint: self.items_left_to_mint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenSectionLayout {
    /// Versions 0 and 1: NFT-only lines, no tail.
    Legacy,
    V2,
    V3,
    V4,
    V5,
}

impl HiddenSectionLayout {
    /// Total over `u8`. Anything past the newest known version reads as V5.
    pub fn for_version(version: u8) -> Self {
        match version {
            0 | 1 => Self::Legacy,
            2 => Self::V2,
            3 => Self::V3,
            4 => Self::V4,
            _ => Self::V5,
        }
    }

    pub fn config_line_len(self) -> usize {
        match self {
            Self::Legacy => CONFIG_LINE_LEN,
            _ => CONFIG_LINE_V2_LEN,
        }
    }

    pub fn tail_len(self) -> usize {
        match self {
            Self::Legacy | Self::V2 => 0,
            Self::V3 => SALE_FLAGS_LEN,
            Self::V4 => SALE_FLAGS_LEN + BUY_BACK_CONFIG_LEN + 8,
            Self::V5 => SALE_FLAGS_LEN + BUY_BACK_CONFIG_LEN + 8 + 8,
        }
    }

    /// Exact number of bytes the layout occupies for `item_capacity` slots.
    pub fn byte_len(self, item_capacity: u64) -> Result<usize, GumballLayoutError> {
        let capacity =
            usize::try_from(item_capacity).map_err(|_| GumballLayoutError::MathOverflow)?;
        let per_slot = self
            .config_line_len()
            .checked_add(4)
            .ok_or(GumballLayoutError::MathOverflow)?;
        capacity
            .checked_mul(per_slot)
            .and_then(|len| len.checked_add(4))
            .and_then(|len| len.checked_add(2 * bit_map_len(capacity)))
            .and_then(|len| len.checked_add(self.tail_len()))
            .ok_or(GumballLayoutError::MathOverflow)
    }

    /// Decodes the section from the start of `data`. Bytes past
    /// `byte_len(item_capacity)` are ignored.
    pub fn decode(
        self,
        data: &[u8],
        item_capacity: u64,
    ) -> Result<HiddenSection, GumballLayoutError> {
        let needed = self.byte_len(item_capacity)?;
        ensure_len(data, 0, needed)?;
        let capacity = item_capacity as usize;

        let mut offset = 0usize;
        let section = match self {
            Self::Legacy => HiddenSection::Legacy(ItemTable::read(data, &mut offset, capacity)?),
            Self::V2 => HiddenSection::V2(ItemTable::read(data, &mut offset, capacity)?),
            Self::V3 => HiddenSection::V3 {
                items: ItemTable::read(data, &mut offset, capacity)?,
                flags: SaleFlags::read(data, &mut offset)?,
            },
            Self::V4 => HiddenSection::V4 {
                items: ItemTable::read(data, &mut offset, capacity)?,
                flags: SaleFlags::read(data, &mut offset)?,
                buy_back: BuyBackState::read(data, &mut offset)?,
            },
            Self::V5 => HiddenSection::V5 {
                items: ItemTable::read(data, &mut offset, capacity)?,
                flags: SaleFlags::read(data, &mut offset)?,
                buy_back: BuyBackState::read(data, &mut offset)?,
                total_proceeds_settled: read_u64(data, &mut offset)?,
            },
        };
        debug_assert_eq!(offset, needed);
        Ok(section)
    }
}

/// Selects the layout for `version` and decodes the section.
pub fn decode_hidden_section(
    version: u8,
    item_capacity: u64,
    data: &[u8],
) -> Result<HiddenSection, GumballLayoutError> {
    let layout = HiddenSectionLayout::for_version(version);
    let section = layout.decode(data, item_capacity)?;
    debug!(
        version,
        ?layout,
        item_capacity,
        items_loaded = section.items_loaded(),
        "decoded gumball hidden section"
    );
    Ok(section)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HiddenSection {
    Legacy(ItemTable<ConfigLine>),
    V2(ItemTable<ConfigLineV2>),
    V3 {
        items: ItemTable<ConfigLineV2>,
        flags: SaleFlags,
    },
    V4 {
        items: ItemTable<ConfigLineV2>,
        flags: SaleFlags,
        buy_back: BuyBackState,
    },
    V5 {
        items: ItemTable<ConfigLineV2>,
        flags: SaleFlags,
        buy_back: BuyBackState,
        total_proceeds_settled: u64,
    },
}

/// A hidden section upgraded to the newest shape, with the fields older
/// layouts lack filled by their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalHiddenSection {
    pub items: ItemTable<ConfigLineV2>,
    pub flags: SaleFlags,
    pub buy_back: BuyBackState,
    pub total_proceeds_settled: u64,
}

impl HiddenSection {
    pub fn layout(&self) -> HiddenSectionLayout {
        match self {
            Self::Legacy(_) => HiddenSectionLayout::Legacy,
            Self::V2(_) => HiddenSectionLayout::V2,
            Self::V3 { .. } => HiddenSectionLayout::V3,
            Self::V4 { .. } => HiddenSectionLayout::V4,
            Self::V5 { .. } => HiddenSectionLayout::V5,
        }
    }

    pub fn items_loaded(&self) -> u32 {
        match self {
            Self::Legacy(items) => items.items_loaded,
            Self::V2(items)
            | Self::V3 { items, .. }
            | Self::V4 { items, .. }
            | Self::V5 { items, .. } => items.items_loaded,
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            Self::Legacy(items) => items.capacity(),
            Self::V2(items)
            | Self::V3 { items, .. }
            | Self::V4 { items, .. }
            | Self::V5 { items, .. } => items.capacity(),
        }
    }

    /// Legacy lines get an amount of 1; missing tail fields are disabled or zero.
    pub fn into_canonical(self) -> CanonicalHiddenSection {
        match self {
            Self::Legacy(items) => CanonicalHiddenSection {
                items: items.map_lines(ConfigLineV2::from),
                ..CanonicalHiddenSection::default()
            },
            Self::V2(items) => CanonicalHiddenSection {
                items,
                ..CanonicalHiddenSection::default()
            },
            Self::V3 { items, flags } => CanonicalHiddenSection {
                items,
                flags,
                ..CanonicalHiddenSection::default()
            },
            Self::V4 {
                items,
                flags,
                buy_back,
            } => CanonicalHiddenSection {
                items,
                flags,
                buy_back,
                total_proceeds_settled: 0,
            },
            Self::V5 {
                items,
                flags,
                buy_back,
                total_proceeds_settled,
            } => CanonicalHiddenSection {
                items,
                flags,
                buy_back,
                total_proceeds_settled,
            },
        }
    }

    /// Writes the section at the start of `data`, returning the bytes written.
    pub fn write_to_slice(&self, data: &mut [u8]) -> Result<usize, GumballLayoutError> {
        let mut offset = 0usize;
        match self {
            Self::Legacy(items) => items.write(data, &mut offset)?,
            Self::V2(items) => items.write(data, &mut offset)?,
            Self::V3 { items, flags } => {
                items.write(data, &mut offset)?;
                flags.write(data, &mut offset)?;
            }
            Self::V4 {
                items,
                flags,
                buy_back,
            } => {
                items.write(data, &mut offset)?;
                flags.write(data, &mut offset)?;
                buy_back.write(data, &mut offset)?;
            }
            Self::V5 {
                items,
                flags,
                buy_back,
                total_proceeds_settled,
            } => {
                items.write(data, &mut offset)?;
                flags.write(data, &mut offset)?;
                buy_back.write(data, &mut offset)?;
                write_u64(data, &mut offset, *total_proceeds_settled)?;
            }
        }
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table<L: Clone>(line: L, capacity: usize, items_loaded: u32) -> ItemTable<L> {
        ItemTable {
            items_loaded,
            config_lines: vec![line; capacity],
            items_claimed_map: (0..capacity).map(|i| i % 2 == 0).collect(),
            items_settled_map: (0..capacity).map(|i| i % 3 == 0).collect(),
            items_left_to_mint: (0..capacity as u32).rev().collect(),
        }
    }

    fn line_v2(amount: u64) -> ConfigLineV2 {
        ConfigLineV2 {
            mint: [1u8; 32],
            seller: [2u8; 32],
            buyer: [3u8; 32],
            token_standard: TokenStandard::Fungible,
            amount,
        }
    }

    fn sample(layout: HiddenSectionLayout, capacity: usize) -> HiddenSection {
        let items = table(line_v2(42), capacity, capacity as u32);
        let flags = SaleFlags {
            disable_royalties: true,
            unused: [0u8; 3],
            disable_primary_split: true,
        };
        let buy_back = BuyBackState {
            config: BuyBackConfig {
                enabled: true,
                to_gumball_machine: false,
                oracle_signer: [9u8; 32],
                value_pct: 90,
                marketplace_fee_bps: 100,
                cutoff_pct: 20,
            },
            funds_available: 5_000_000,
        };
        match layout {
            HiddenSectionLayout::Legacy => HiddenSection::Legacy(table(
                ConfigLine {
                    mint: [1u8; 32],
                    seller: [2u8; 32],
                    buyer: [0u8; 32],
                    token_standard: TokenStandard::NonFungible,
                },
                capacity,
                capacity as u32,
            )),
            HiddenSectionLayout::V2 => HiddenSection::V2(items),
            HiddenSectionLayout::V3 => HiddenSection::V3 { items, flags },
            HiddenSectionLayout::V4 => HiddenSection::V4 {
                items,
                flags,
                buy_back,
            },
            HiddenSectionLayout::V5 => HiddenSection::V5 {
                items,
                flags,
                buy_back,
                total_proceeds_settled: 77,
            },
        }
    }

    #[test]
    fn version_selects_layout() {
        assert_eq!(HiddenSectionLayout::for_version(0), HiddenSectionLayout::Legacy);
        assert_eq!(HiddenSectionLayout::for_version(1), HiddenSectionLayout::Legacy);
        assert_eq!(HiddenSectionLayout::for_version(2), HiddenSectionLayout::V2);
        assert_eq!(HiddenSectionLayout::for_version(3), HiddenSectionLayout::V3);
        assert_eq!(HiddenSectionLayout::for_version(4), HiddenSectionLayout::V4);
        assert_eq!(HiddenSectionLayout::for_version(5), HiddenSectionLayout::V5);
        assert_eq!(HiddenSectionLayout::for_version(u8::MAX), HiddenSectionLayout::V5);
    }

    #[test]
    fn record_widths_match_program() {
        assert_eq!(CONFIG_LINE_LEN, 97);
        assert_eq!(CONFIG_LINE_V2_LEN, 105);
        assert_eq!(BUY_BACK_CONFIG_LEN, 38);
    }

    #[test]
    fn byte_len_per_layout() {
        // 4 + 5 * 97 + 2 * 1 + 5 * 4
        assert_eq!(HiddenSectionLayout::Legacy.byte_len(5).unwrap(), 511);
        // 4 + 5 * 105 + 2 * 1 + 5 * 4
        assert_eq!(HiddenSectionLayout::V2.byte_len(5).unwrap(), 551);
        assert_eq!(HiddenSectionLayout::V3.byte_len(5).unwrap(), 556);
        assert_eq!(HiddenSectionLayout::V4.byte_len(5).unwrap(), 602);
        assert_eq!(HiddenSectionLayout::V5.byte_len(5).unwrap(), 610);
        // 4 + 1000 * 109 + 2 * 126
        assert_eq!(HiddenSectionLayout::V2.byte_len(1000).unwrap(), 109_256);
    }

    #[test]
    fn byte_len_overflow_is_an_error() {
        assert_eq!(
            HiddenSectionLayout::V5.byte_len(u64::MAX),
            Err(GumballLayoutError::MathOverflow)
        );
    }

    #[test]
    fn every_layout_round_trips_and_consumes_exact_width() {
        for layout in [
            HiddenSectionLayout::Legacy,
            HiddenSectionLayout::V2,
            HiddenSectionLayout::V3,
            HiddenSectionLayout::V4,
            HiddenSectionLayout::V5,
        ] {
            for capacity in [0usize, 3, 8, 16] {
                let section = sample(layout, capacity);
                let len = layout.byte_len(capacity as u64).unwrap();
                // trailing slack must be ignored
                let mut data = vec![0u8; len + 16];
                let written = section.write_to_slice(&mut data).unwrap();
                assert_eq!(written, len, "{layout:?} capacity {capacity}");

                let parsed = layout.decode(&data, capacity as u64).unwrap();
                assert_eq!(parsed, section, "{layout:?} capacity {capacity}");
                assert_eq!(parsed.layout(), layout);
            }
        }
    }

    #[test]
    fn one_byte_short_is_truncation() {
        for layout in [HiddenSectionLayout::Legacy, HiddenSectionLayout::V4] {
            let len = layout.byte_len(8).unwrap();
            let data = vec![0u8; len - 1];
            assert_eq!(
                layout.decode(&data, 8),
                Err(GumballLayoutError::SliceTooShort {
                    needed: len,
                    actual: len - 1
                })
            );
        }
    }

    #[test]
    fn items_loaded_above_capacity_is_rejected() {
        let len = HiddenSectionLayout::V2.byte_len(2).unwrap();
        let mut data = vec![0u8; len];
        data[..4].copy_from_slice(&3u32.to_le_bytes());
        assert_eq!(
            HiddenSectionLayout::V2.decode(&data, 2),
            Err(GumballLayoutError::ItemsLoadedExceedsCapacity {
                items_loaded: 3,
                item_capacity: 2
            })
        );
    }

    #[test]
    fn unknown_token_standard_is_preserved() {
        let mut section = sample(HiddenSectionLayout::V2, 2);
        if let HiddenSection::V2(items) = &mut section {
            items.config_lines[1].token_standard = TokenStandard::Unknown(200);
        }
        let len = HiddenSectionLayout::V2.byte_len(2).unwrap();
        let mut data = vec![0u8; len];
        section.write_to_slice(&mut data).unwrap();
        let parsed = HiddenSectionLayout::V2.decode(&data, 2).unwrap();
        assert_eq!(parsed, section);
    }

    #[test]
    fn legacy_upgrades_with_amount_one_and_disabled_tail() {
        let canonical = sample(HiddenSectionLayout::Legacy, 3).into_canonical();
        assert!(canonical.items.config_lines.iter().all(|line| line.amount == 1));
        assert!(!canonical.flags.disable_primary_split);
        assert!(!canonical.flags.disable_royalties);
        assert_eq!(canonical.buy_back, BuyBackState::default());
        assert!(!canonical.buy_back.config.enabled);
        assert_eq!(canonical.buy_back.config.oracle_signer, [0u8; 32]);
        assert_eq!(canonical.total_proceeds_settled, 0);
    }

    #[test]
    fn v3_keeps_flags_and_defaults_buy_back() {
        let canonical = sample(HiddenSectionLayout::V3, 2).into_canonical();
        assert!(canonical.flags.disable_primary_split);
        assert_eq!(canonical.buy_back, BuyBackState::default());
    }

    #[test]
    fn v4_keeps_buy_back() {
        let canonical = sample(HiddenSectionLayout::V4, 2).into_canonical();
        assert!(canonical.buy_back.config.enabled);
        assert_eq!(canonical.buy_back.funds_available, 5_000_000);
        assert_eq!(canonical.total_proceeds_settled, 0);
    }

    #[test]
    fn encoder_rejects_ragged_tables() {
        let mut items = table(line_v2(1), 4, 4);
        items.items_left_to_mint.pop();
        let mut data = vec![0u8; 1024];
        assert_eq!(
            HiddenSection::V2(items).write_to_slice(&mut data),
            Err(GumballLayoutError::InconsistentItemTable {
                field: "items_left_to_mint",
                len: 3,
                capacity: 4
            })
        );
    }

    #[test]
    fn decode_config_lines_reads_every_slot() {
        let lines = vec![line_v2(1), line_v2(2), line_v2(3)];
        let mut data = vec![0u8; 3 * CONFIG_LINE_V2_LEN];
        let mut offset = 0usize;
        for line in &lines {
            line.write(&mut data, &mut offset).unwrap();
        }

        let mut offset = 0usize;
        let parsed = decode_config_lines_v2(&data, &mut offset, 3).unwrap();
        assert_eq!(parsed, lines);
        assert_eq!(offset, data.len());

        let mut offset = 0usize;
        assert!(matches!(
            decode_config_lines_v2(&data, &mut offset, 4),
            Err(GumballLayoutError::SliceTooShort { .. })
        ));
    }

    #[test]
    fn legacy_lines_are_97_bytes_apart() {
        let mut data = vec![0u8; 2 * CONFIG_LINE_LEN];
        data[CONFIG_LINE_LEN] = 7; // mint[0] of the second line
        data[2 * CONFIG_LINE_LEN - 1] = 1; // token standard of the second line
        let mut offset = 0usize;
        let lines = decode_config_lines(&data, &mut offset, 2).unwrap();
        assert_eq!(lines[0], ConfigLine::default());
        assert_eq!(lines[1].mint[0], 7);
        assert_eq!(lines[1].token_standard, TokenStandard::Core);
        assert_eq!(offset, 2 * CONFIG_LINE_LEN);
    }
}
