use std::collections::BTreeMap;

use serde::Serialize;

use crate::services::scan_session::ScanSession;

/// Expected/scanned/missing counts for one item-code prefix within a
/// session. The frontend shows these as the per-box progress table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCodeTally {
    pub item_code: String,
    pub expected: usize,
    pub scanned: usize,
    pub missing: usize,
}

/// Group a session's items by their item-code prefix, in code order.
///
/// Pure aggregation over the session arrays; the session itself stays the
/// single source of truth and nothing here mutates it.
pub fn tally_by_item_code(session: &ScanSession) -> Vec<ItemCodeTally> {
    let mut tallies: BTreeMap<&str, ItemCodeTally> = BTreeMap::new();

    for item in &session.expected_items {
        tallies
            .entry(item.item_code.as_str())
            .or_insert_with(|| ItemCodeTally {
                item_code: item.item_code.clone(),
                expected: 0,
                scanned: 0,
                missing: 0,
            })
            .expected += 1;
    }
    for item in &session.missing_items {
        if let Some(tally) = tallies.get_mut(item.item_code.as_str()) {
            tally.missing += 1;
        }
    }
    for tally in tallies.values_mut() {
        tally.scanned = tally.expected - tally.missing;
    }

    tallies.into_values().collect()
}

/// Case-insensitive substring filter over any list with a barcode, used to
/// narrow the session view without refetching.
pub fn filter_by_barcode<'a, T>(
    items: &'a [T],
    term: &str,
    barcode_of: impl Fn(&T) -> &str,
) -> Vec<&'a T> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| barcode_of(item).to_lowercase().contains(&term))
        .collect()
}
