use tracing::warn;

use crate::{
    byte_io::PUBKEY_LEN,
    hidden_section::{CanonicalHiddenSection, TokenStandard},
};

/// One loaded slot of a machine, flattened for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GumballMachineItem {
    pub index: u32,
    /// The slot has been drawn, i.e. it is no longer in the live worklist.
    pub is_drawn: bool,
    pub is_claimed: bool,
    pub is_settled: bool,
    pub mint: [u8; PUBKEY_LEN],
    pub seller: [u8; PUBKEY_LEN],
    /// `None` until the slot is drawn and the buyer recorded.
    pub buyer: Option<[u8; PUBKEY_LEN]>,
    pub token_standard: TokenStandard,
    pub amount: u64,
}

/// Length of the live prefix of `items_left_to_mint`.
pub fn items_remaining(items_loaded: u32, items_redeemed: u64) -> u64 {
    let items_loaded = u64::from(items_loaded);
    if items_redeemed > items_loaded {
        warn!(
            items_loaded,
            items_redeemed, "more items redeemed than loaded, treating worklist as empty"
        );
    }
    items_loaded.saturating_sub(items_redeemed)
}

/// Builds the item view for every loaded slot. Slots past `items_loaded`
/// are never exposed.
pub fn build_items(
    items_redeemed: u64,
    hidden: &CanonicalHiddenSection,
) -> Vec<GumballMachineItem> {
    let table = &hidden.items;
    let loaded = (table.items_loaded as usize).min(table.config_lines.len());
    let remaining = usize::try_from(items_remaining(table.items_loaded, items_redeemed))
        .unwrap_or(usize::MAX);

    let mut undrawn = vec![false; loaded];
    for index in table.items_left_to_mint.iter().take(remaining) {
        if let Some(slot) = undrawn.get_mut(*index as usize) {
            *slot = true;
        }
    }

    table
        .config_lines
        .iter()
        .take(loaded)
        .enumerate()
        .map(|(index, line)| GumballMachineItem {
            index: index as u32,
            is_drawn: !undrawn[index],
            is_claimed: table.items_claimed_map.get(index).copied().unwrap_or(false),
            is_settled: table.items_settled_map.get(index).copied().unwrap_or(false),
            mint: line.mint,
            seller: line.seller,
            buyer: (line.buyer != [0u8; PUBKEY_LEN]).then_some(line.buyer),
            token_standard: line.token_standard,
            amount: line.amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hidden_section::{ConfigLineV2, ItemTable};

    fn section(
        capacity: usize,
        items_loaded: u32,
        left_to_mint: Vec<u32>,
    ) -> CanonicalHiddenSection {
        let mut items_left_to_mint = left_to_mint;
        items_left_to_mint.resize(capacity, 0);
        CanonicalHiddenSection {
            items: ItemTable {
                items_loaded,
                config_lines: (0..capacity)
                    .map(|i| ConfigLineV2 {
                        mint: [i as u8 + 1; 32],
                        seller: [0xaa; 32],
                        amount: 1,
                        ..ConfigLineV2::default()
                    })
                    .collect(),
                items_claimed_map: vec![false; capacity],
                items_settled_map: vec![false; capacity],
                items_left_to_mint,
            },
            ..CanonicalHiddenSection::default()
        }
    }

    #[test]
    fn only_loaded_slots_are_exposed() {
        let hidden = section(5, 3, vec![0, 1, 2]);
        let items = build_items(0, &hidden);
        assert_eq!(items.len(), 3);
        assert_eq!(
            items.iter().map(|item| item.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(items.iter().all(|item| !item.is_drawn));
    }

    #[test]
    fn drawn_flag_follows_live_worklist_prefix() {
        // slot 1 was drawn and swapped out; the stale tail entry is ignored
        let hidden = section(4, 4, vec![0, 3, 2, 1]);
        let items = build_items(1, &hidden);
        let drawn: Vec<bool> = items.iter().map(|item| item.is_drawn).collect();
        assert_eq!(drawn, vec![false, true, false, false]);
    }

    #[test]
    fn zero_buyer_is_none() {
        let mut hidden = section(2, 2, vec![0]);
        hidden.items.config_lines[1].buyer = [7u8; 32];
        let items = build_items(1, &hidden);
        assert_eq!(items[0].buyer, None);
        assert_eq!(items[1].buyer, Some([7u8; 32]));
    }

    #[test]
    fn over_redeemed_machine_reads_as_fully_drawn() {
        assert_eq!(items_remaining(3, 5), 0);
        let hidden = section(3, 3, vec![0, 1, 2]);
        let items = build_items(5, &hidden);
        assert!(items.iter().all(|item| item.is_drawn));
    }

    #[test]
    fn worklist_entries_past_loaded_are_ignored() {
        let hidden = section(4, 2, vec![3, 0]);
        let items = build_items(0, &hidden);
        assert_eq!(items.len(), 2);
        assert!(!items[0].is_drawn);
        assert!(items[1].is_drawn);
    }

    #[test]
    fn claimed_and_settled_come_from_bitmaps() {
        let mut hidden = section(3, 3, vec![]);
        hidden.items.items_claimed_map[2] = true;
        hidden.items.items_settled_map[0] = true;
        let items = build_items(3, &hidden);
        assert!(items[2].is_claimed && !items[2].is_settled);
        assert!(items[0].is_settled && !items[0].is_claimed);
    }
}
