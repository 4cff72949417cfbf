use crate::models::{Group, SearchedWell, Well};

/// Pair every well with the search string that found it.
pub fn tag<'a>(wells: &'a [Well], search: &'a str) -> Vec<SearchedWell<'a>> {
    wells.iter().map(|well| SearchedWell { well, search }).collect()
}

/// Partition tagged wells by region.
///
/// Groups appear in the order their key is first seen and keep the input
/// order of their members. Wells without a region land in
/// [`UNKNOWN_REGION`](crate::models::UNKNOWN_REGION).
pub fn group_by_region<'a>(wells: &[SearchedWell<'a>]) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    for w in wells {
        let key = w.well.region_key();
        match groups.iter_mut().find(|g| g.key == *key) {
            Some(g) => g.wells.push(*w),
            None => groups.push(Group {
                key: key.into_owned(),
                wells: vec![*w],
            }),
        }
    }
    groups
}
