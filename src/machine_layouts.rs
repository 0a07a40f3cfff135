use crate::{
    anchor_compat::{ANCHOR_DISCRIMINATOR_LEN, GUMBALL_MACHINE_DISCRIMINATOR},
    byte_io::{
        read_bool, read_fixed, read_option_tag, read_pubkey, read_string, read_u16, read_u64,
        read_u8, write_bool, write_bytes, write_string, write_u16, write_u64, write_u8,
        PUBKEY_LEN,
    },
    errors::GumballLayoutError,
};

pub const CURRENT_VERSION: u8 = 5;
pub const MAX_URI_LENGTH: usize = 196;

pub const FEE_CONFIG_LEN: usize = PUBKEY_LEN + 2;
pub const GUMBALL_SETTINGS_MAX_LEN: usize = 4 + MAX_URI_LENGTH // uri
    + 8 // item_capacity
    + 2 // items_per_seller
    + 1 + 32 // sellers_merkle_root
    + 2 // curator_fee_bps
    + 1 // hide_sold_items
    + PUBKEY_LEN; // payment_mint

/// Bytes reserved for the header; the hidden section always starts here.
pub const GUMBALL_MACHINE_HIDDEN_SECTION: usize = ANCHOR_DISCRIMINATOR_LEN
    + 1 // version
    + PUBKEY_LEN // authority
    + PUBKEY_LEN // mint_authority
    + 1 + FEE_CONFIG_LEN // marketplace_fee_config
    + 8 // items_redeemed
    + 8 // items_settled
    + 8 // total_revenue
    + 1 // state
    + GUMBALL_SETTINGS_MAX_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GumballState {
    /// Initial state.
    #[default]
    None,
    /// Sellers invited, only some details can be updated.
    DetailsFinalized,
    SaleLive,
    /// Sale ended, items can be settled.
    SaleEnded,
}

impl GumballState {
    pub fn from_u8(value: u8) -> Result<Self, GumballLayoutError> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::DetailsFinalized),
            2 => Ok(Self::SaleLive),
            3 => Ok(Self::SaleEnded),
            other => Err(GumballLayoutError::InvalidGumballState(other)),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::DetailsFinalized => 1,
            Self::SaleLive => 2,
            Self::SaleEnded => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeConfig {
    /// Where fees will go.
    pub fee_account: [u8; PUBKEY_LEN],
    pub fee_bps: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GumballSettings {
    /// Off-chain metadata uri, at most `MAX_URI_LENGTH` bytes.
    pub uri: String,
    pub item_capacity: u64,
    /// Max number of items a single seller can add.
    pub items_per_seller: u16,
    pub sellers_merkle_root: Option<[u8; 32]>,
    /// Fee paid to the machine authority, in basis points.
    pub curator_fee_bps: u16,
    pub hide_sold_items: bool,
    pub payment_mint: [u8; PUBKEY_LEN],
}

/// The Borsh-encoded prefix of a `GumballMachine` account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GumballMachineHeader {
    pub discriminator: [u8; ANCHOR_DISCRIMINATOR_LEN],
    pub version: u8,
    pub authority: [u8; PUBKEY_LEN],
    /// Authority allowed to draw from the machine.
    pub mint_authority: [u8; PUBKEY_LEN],
    pub marketplace_fee_config: Option<FeeConfig>,
    pub items_redeemed: u64,
    pub items_settled: u64,
    /// Lamports or tokens received from draws.
    pub total_revenue: u64,
    pub state: GumballState,
    pub settings: GumballSettings,
}

impl Default for GumballMachineHeader {
    fn default() -> Self {
        Self {
            discriminator: GUMBALL_MACHINE_DISCRIMINATOR,
            version: CURRENT_VERSION,
            authority: [0u8; PUBKEY_LEN],
            mint_authority: [0u8; PUBKEY_LEN],
            marketplace_fee_config: None,
            items_redeemed: 0,
            items_settled: 0,
            total_revenue: 0,
            state: GumballState::None,
            settings: GumballSettings::default(),
        }
    }
}

impl GumballMachineHeader {
    /// Decodes the header from the start of `data`, returning it with the
    /// number of bytes it occupied.
    pub fn read_from_account_data(data: &[u8]) -> Result<(Self, usize), GumballLayoutError> {
        let mut offset = 0usize;
        let discriminator = read_fixed::<ANCHOR_DISCRIMINATOR_LEN>(data, &mut offset)?;
        let version = read_u8(data, &mut offset)?;
        let authority = read_pubkey(data, &mut offset)?;
        let mint_authority = read_pubkey(data, &mut offset)?;
        let marketplace_fee_config = if read_option_tag(data, &mut offset)? {
            Some(FeeConfig {
                fee_account: read_pubkey(data, &mut offset)?,
                fee_bps: read_u16(data, &mut offset)?,
            })
        } else {
            None
        };
        let items_redeemed = read_u64(data, &mut offset)?;
        let items_settled = read_u64(data, &mut offset)?;
        let total_revenue = read_u64(data, &mut offset)?;
        let state = GumballState::from_u8(read_u8(data, &mut offset)?)?;
        let settings = read_settings(data, &mut offset)?;

        Ok((
            Self {
                discriminator,
                version,
                authority,
                mint_authority,
                marketplace_fee_config,
                items_redeemed,
                items_settled,
                total_revenue,
                state,
                settings,
            },
            offset,
        ))
    }

    /// Writes the header at the start of `data`, returning the bytes written.
    pub fn write_to_account_data(&self, data: &mut [u8]) -> Result<usize, GumballLayoutError> {
        if self.settings.uri.len() > MAX_URI_LENGTH {
            return Err(GumballLayoutError::UriTooLong(self.settings.uri.len()));
        }

        let mut offset = 0usize;
        write_bytes(data, &mut offset, &self.discriminator)?;
        write_u8(data, &mut offset, self.version)?;
        write_bytes(data, &mut offset, &self.authority)?;
        write_bytes(data, &mut offset, &self.mint_authority)?;
        match &self.marketplace_fee_config {
            Some(fee_config) => {
                write_u8(data, &mut offset, 1)?;
                write_bytes(data, &mut offset, &fee_config.fee_account)?;
                write_u16(data, &mut offset, fee_config.fee_bps)?;
            }
            None => write_u8(data, &mut offset, 0)?,
        }
        write_u64(data, &mut offset, self.items_redeemed)?;
        write_u64(data, &mut offset, self.items_settled)?;
        write_u64(data, &mut offset, self.total_revenue)?;
        write_u8(data, &mut offset, self.state.as_u8())?;
        write_settings(&self.settings, data, &mut offset)?;
        Ok(offset)
    }
}

fn read_settings(data: &[u8], offset: &mut usize) -> Result<GumballSettings, GumballLayoutError> {
    let uri = read_string(data, offset)?;
    let item_capacity = read_u64(data, offset)?;
    let items_per_seller = read_u16(data, offset)?;
    let sellers_merkle_root = if read_option_tag(data, offset)? {
        Some(read_fixed::<32>(data, offset)?)
    } else {
        None
    };
    let curator_fee_bps = read_u16(data, offset)?;
    let hide_sold_items = read_bool(data, offset)?;
    let payment_mint = read_pubkey(data, offset)?;

    Ok(GumballSettings {
        uri,
        item_capacity,
        items_per_seller,
        sellers_merkle_root,
        curator_fee_bps,
        hide_sold_items,
        payment_mint,
    })
}

fn write_settings(
    settings: &GumballSettings,
    data: &mut [u8],
    offset: &mut usize,
) -> Result<(), GumballLayoutError> {
    write_string(data, offset, &settings.uri)?;
    write_u64(data, offset, settings.item_capacity)?;
    write_u16(data, offset, settings.items_per_seller)?;
    match &settings.sellers_merkle_root {
        Some(root) => {
            write_u8(data, offset, 1)?;
            write_bytes(data, offset, root)?;
        }
        None => write_u8(data, offset, 0)?,
    }
    write_u16(data, offset, settings.curator_fee_bps)?;
    write_bool(data, offset, settings.hide_sold_items)?;
    write_bytes(data, offset, &settings.payment_mint)
}
