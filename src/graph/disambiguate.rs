use std::collections::HashMap;
use std::f32::consts::PI;

use crate::dataset::Relation;

/// Pixel step between parallel edges of one same-pair group.
pub const PARALLEL_OFFSET_STEP: f32 = 30.0;
/// Fan-out at which a source is treated as a hub. Tunable.
pub const HUB_MIN_FAN_OUT: usize = 4;
/// Above this fan-out the π/3 arc replaces π/4. Tunable.
pub const LARGE_HUB_FAN_OUT: usize = 6;
pub const LARGE_HUB_FAN_ARC: f32 = PI / 3.0;
pub const SMALL_HUB_FAN_ARC: f32 = PI / 4.0;
/// Converts a fan angle (radians) to a curve offset.
pub const FAN_ANGLE_SCALE: f32 = 60.0;

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeLayout {
    pub group_key: String,
    pub group_index: usize,
    pub group_total: usize,
    pub hub_index: usize,
    pub hub_total: usize,
    pub is_hub: bool,
    pub is_multiple: bool,
    pub curve_offset: f32,
}

pub fn pair_key(source: &str, target: &str) -> String {
    format!("{source}->{target}")
}

/// `0, +k, -2k, +3k, …` by index within the same-pair group.
pub fn parallel_offset(group_index: usize) -> f32 {
    let magnitude = group_index as f32 * PARALLEL_OFFSET_STEP;
    if group_index == 0 {
        0.0
    } else if group_index % 2 == 1 {
        magnitude
    } else {
        -magnitude
    }
}

pub fn fan_offset(hub_index: usize, hub_total: usize) -> f32 {
    let arc = if hub_total > LARGE_HUB_FAN_OUT {
        LARGE_HUB_FAN_ARC
    } else {
        SMALL_HUB_FAN_ARC
    };
    let step = arc / hub_total.saturating_sub(1).max(1) as f32;
    let angle = (-arc / 2.0) + (hub_index as f32 * step);
    angle * FAN_ANGLE_SCALE
}

/// One entry per relation, in input order. Output depends only on the list.
pub fn disambiguate(relations: &[Relation]) -> Vec<EdgeLayout> {
    let mut fan_out: HashMap<&str, usize> = HashMap::new();
    let mut group_sizes: HashMap<(&str, &str), usize> = HashMap::new();
    for relation in relations {
        *fan_out.entry(relation.source.as_str()).or_default() += 1;
        *group_sizes
            .entry((relation.source.as_str(), relation.target.as_str()))
            .or_default() += 1;
    }

    let mut fan_cursor: HashMap<&str, usize> = HashMap::with_capacity(fan_out.len());
    let mut group_cursor: HashMap<(&str, &str), usize> = HashMap::with_capacity(group_sizes.len());

    relations
        .iter()
        .map(|relation| {
            let source = relation.source.as_str();
            let pair = (source, relation.target.as_str());

            let hub_total = fan_out.get(source).copied().unwrap_or(1);
            let group_total = group_sizes.get(&pair).copied().unwrap_or(1);

            let hub_slot = fan_cursor.entry(source).or_default();
            let hub_index = *hub_slot;
            *hub_slot += 1;

            let group_slot = group_cursor.entry(pair).or_default();
            let group_index = *group_slot;
            *group_slot += 1;

            let is_hub = hub_total >= HUB_MIN_FAN_OUT;
            let curve_offset = if group_total > 1 {
                parallel_offset(group_index)
            } else if is_hub {
                fan_offset(hub_index, hub_total)
            } else {
                0.0
            };

            EdgeLayout {
                group_key: pair_key(source, &relation.target),
                group_index,
                group_total,
                hub_index,
                hub_total,
                is_hub,
                is_multiple: group_total > 1 || is_hub,
                curve_offset,
            }
        })
        .collect()
}
