use crate::models::{Snapshot, StoredSnapshot};

/// Whether `current` differs from the last stored observation.
///
/// A product seen for the first time always counts as changed: the baseline is
/// surfaced in the report instead of being silently recorded. An absent price
/// on both sides is equal; stock is compared as exact text.
pub fn detect(prior: Option<&StoredSnapshot>, current: &Snapshot) -> bool {
    let prior_price = prior.and_then(|p| p.price);
    let prior_stock = prior.and_then(|p| p.stock.as_deref());

    current.price != prior_price || Some(current.stock.as_str()) != prior_stock
}
