//! Pure projection of the dashboard snapshot into a flat row list.
//!
//! Rendering and cursor movement both walk the same projected rows, so the
//! projection lives here as a pure function of snapshot plus filter. Same
//! inputs always yield the same rows.

use mailsweep_core::models::{CATEGORY_ORDER, DashboardSnapshot, SenderStatus, SubscriptionSender};

use crate::state::{CategoryFilter, ViewFilter};

/// One visible line on the dashboard.
#[derive(Debug, PartialEq, Eq)]
pub enum Row<'a> {
    CategoryHeader {
        category: &'a str,
        expanded: bool,
        active: usize,
        unsubscribed: usize,
    },
    Sender(&'a SubscriptionSender),
}

/// Projects the snapshot through the filter into display rows.
///
/// Categories appear in canonical order, then any the server invented, in
/// alphabetical order. Collapsed categories contribute only their header.
/// Empty categories are omitted.
pub fn project<'a>(snapshot: &'a DashboardSnapshot, filter: &ViewFilter) -> Vec<Row<'a>> {
    let mut rows = Vec::new();

    for category in ordered_categories(snapshot) {
        if let CategoryFilter::Category(selected) = &filter.active_category {
            if selected != category {
                continue;
            }
        }
        let Some(senders) = snapshot.categories.get(category) else {
            continue;
        };
        if senders.is_empty() {
            continue;
        }

        let expanded = filter.is_expanded(category);
        let unsubscribed = senders
            .iter()
            .filter(|s| s.status == SenderStatus::Unsubscribed)
            .count();
        rows.push(Row::CategoryHeader {
            category,
            expanded,
            active: senders.len() - unsubscribed,
            unsubscribed,
        });
        if expanded {
            rows.extend(senders.iter().map(Row::Sender));
        }
    }

    rows
}

/// Categories present in the snapshot, canonical order first, then
/// unknowns alphabetically (the snapshot map is already sorted).
pub fn ordered_categories(snapshot: &DashboardSnapshot) -> Vec<&str> {
    let mut ordered: Vec<&str> = CATEGORY_ORDER
        .iter()
        .copied()
        .filter(|c| snapshot.categories.contains_key(*c))
        .collect();
    ordered.extend(
        snapshot
            .categories
            .keys()
            .map(String::as_str)
            .filter(|c| !CATEGORY_ORDER.contains(c)),
    );
    ordered
}
