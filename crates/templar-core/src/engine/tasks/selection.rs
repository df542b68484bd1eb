use crate::engine::template::{Template, TemplateKey};
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Ranking of alternative templates: higher combined score first, then the
/// better experiment type, then the finer resolution.
pub fn compare_templates(a: &Template, b: &Template) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.quality.experiment_type.cmp(&b.quality.experiment_type))
        .then_with(|| a.quality.resolution.total_cmp(&b.quality.resolution))
}

/// Groups candidates that describe the same logical domain or interaction,
/// keeping groups in the order their first member appeared.
pub fn group_by_identity(candidates: Vec<Template>) -> Vec<Vec<Template>> {
    let mut slots: HashMap<TemplateKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<Template>> = Vec::new();
    for candidate in candidates {
        let key = candidate.identity_key();
        match slots.get(&key) {
            Some(&slot) => groups[slot].push(candidate),
            None => {
                slots.insert(key, groups.len());
                groups.push(vec![candidate]);
            }
        }
    }
    groups
}

/// Picks one winner per group, in group order.
pub fn select_best(groups: Vec<Vec<Template>>) -> Vec<Template> {
    groups
        .into_iter()
        .filter_map(|group| group.into_iter().sorted_by(compare_templates).next())
        .collect()
}

#[instrument(skip_all, name = "selection_task")]
pub fn run(candidates: Vec<Template>) -> Vec<Template> {
    let total = candidates.len();
    let groups = group_by_identity(candidates);
    let group_count = groups.len();
    let winners = select_best(groups);
    debug!(candidates = total, groups = group_count, "Selected best templates.");
    winners
}
