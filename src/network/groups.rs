/*
This code is part of the FlowNet drainage-network analysis library.
Created: 14/03/2025
Last Modified: 02/07/2025
License: MIT
*/

/// The topologically ordered grouping of nodes: a single backing array of
/// node ids sorted by (level, id) plus one offset per level. `group(l)` is
/// the ascending-id slice of nodes whose level equals `l`; the union of all
/// groups partitions `[0, N)` and the last group holds exactly the sinks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupIndex {
    order: Vec<usize>,
    offsets: Vec<usize>,
}

impl GroupIndex {
    /// Buckets nodes by level with a counting sort. Iterating node ids in
    /// ascending order keeps each bucket id-sorted without a comparison
    /// sort.
    pub fn from_levels(levels: &[usize]) -> GroupIndex {
        let n = levels.len();
        if n == 0 {
            return GroupIndex {
                order: Vec::new(),
                offsets: vec![0],
            };
        }
        let n_levels = levels.iter().max().unwrap() + 1;
        let mut offsets = vec![0usize; n_levels + 1];
        for &l in levels {
            offsets[l + 1] += 1;
        }
        for l in 0..n_levels {
            offsets[l + 1] += offsets[l];
        }
        let mut cursor = offsets.clone();
        let mut order = vec![0usize; n];
        for (i, &l) in levels.iter().enumerate() {
            order[cursor[l]] = i;
            cursor[l] += 1;
        }
        GroupIndex { order, offsets }
    }

    /// Number of levels.
    pub fn count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn group(&self, level: usize) -> &[usize] {
        &self.order[self.offsets[level]..self.offsets[level + 1]]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.count()).map(move |l| self.group(l))
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

#[cfg(test)]
mod test {
    use super::GroupIndex;

    #[test]
    fn test_groups_partition_and_sort() {
        let levels = vec![1, 0, 2, 0, 1, 2, 0];
        let index = GroupIndex::from_levels(&levels);
        assert_eq!(index.count(), 3);
        assert_eq!(index.group(0), &[1, 3, 6]);
        assert_eq!(index.group(1), &[0, 4]);
        assert_eq!(index.group(2), &[2, 5]);
        let total: usize = index.iter().map(|g| g.len()).sum();
        assert_eq!(total, levels.len());
    }

    #[test]
    fn test_empty_levels() {
        let index = GroupIndex::from_levels(&[]);
        assert_eq!(index.count(), 0);
        assert!(index.order().is_empty());
    }
}
