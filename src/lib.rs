use solana_address::{address, Address};

pub mod account;
pub mod anchor_compat;
pub mod bit_view;
pub mod byte_io;
pub mod errors;
pub mod hidden_section;
pub mod items;
pub mod machine_layouts;

pub use account::{encode_account, gumball_machine_size, DecodeOptions, GumballMachineAccount};
pub use errors::GumballLayoutError;
pub use hidden_section::{HiddenSection, HiddenSectionLayout};
pub use items::GumballMachineItem;
pub use machine_layouts::GumballMachineHeader;

pub const MALLOW_GUMBALL_ID: Address = address!("MGUMqztv7MHgoHBYWbvMyL3E3NJ4UHfTwgLJUQAbKGa");
pub const GUMBALL_GUARD_ID: Address = address!("GGRDy4ieS7ExrUu313QkszyuT9o3BvDLuc3H5VLgCpSF");
