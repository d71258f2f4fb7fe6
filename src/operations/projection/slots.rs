use std::collections::BTreeMap;

use super::divider::divider_tabs;
use super::PanelDraft;
use crate::math::bounds::Bounds2;
use crate::math::polygon_2d::rectangle;
use crate::math::Point2;
use crate::tree::PanelId;

/// Cuts a slot into each mate for every divider tab.
///
/// The tab's world box is taken into the mate's frame and its footprint
/// becomes a rectangular slot. Slots are numbered per mate in draft order.
pub(crate) fn add_tab_slots(drafts: &mut [PanelDraft]) {
    let index: BTreeMap<PanelId, usize> = drafts.iter().enumerate().map(|(i, d)| (d.id, i)).collect();
    let tabs: Vec<_> = drafts
        .iter()
        .filter(|d| d.id.is_divider())
        .flat_map(|d| divider_tabs(d).into_iter().map(move |(mate, corners)| (d.id, mate, corners)))
        .collect();

    for (from, mate, corners) in tabs {
        let Some(&i) = index.get(&mate) else {
            continue;
        };
        let target = &mut drafts[i];
        let local: Vec<Point2> = corners
            .iter()
            .map(|p| {
                let l = target.to_local(p);
                Point2::new(l.x, l.y)
            })
            .collect();
        if let Some(b) = Bounds2::of(&local) {
            target
                .slots
                .push((from, rectangle(b.min_x, b.min_y, b.max_x, b.max_y)));
        }
    }
}
