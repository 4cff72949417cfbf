use crate::group::{group_by_region, tag};
use crate::models::Well;
use serde::{Deserialize, Serialize};

/// Number of wells found in one region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionSummary {
    pub region: String,
    pub count: usize,
}

/// Count wells per region, in the same order the exporter writes groups.
pub fn region_summary(wells: &[Well]) -> Vec<RegionSummary> {
    let tagged = tag(wells, "");
    group_by_region(&tagged)
        .into_iter()
        .map(|g| RegionSummary {
            count: g.wells.len(),
            region: g.key,
        })
        .collect()
}
