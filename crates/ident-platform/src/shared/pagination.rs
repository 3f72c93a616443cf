//! Paging and aggregation shapes shared by list and stat queries.

use serde::{Deserialize, Serialize};

/// Zero-based page window. `limit = 0` means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub limit: u64,
}

impl Page {
    pub fn new(start: u64, limit: u64) -> Self {
        Self { start, limit }
    }

    /// Apply the window to an already filtered and sorted list.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.start as usize);
        if self.limit == 0 {
            iter.collect()
        } else {
            iter.take(self.limit as usize).collect()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub results: Vec<T>,
    /// Matches before paging was applied
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBucket {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatResult {
    /// Sorted by descending count, then key
    pub results: Vec<StatBucket>,
    pub total_count: u64,
}

impl StatResult {
    pub fn from_buckets(mut buckets: Vec<StatBucket>) -> Self {
        buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        let total_count = buckets.iter().map(|b| b.count).sum();
        Self {
            results: buckets,
            total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slice() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(Page::new(2, 3).slice(items.clone()), vec![2, 3, 4]);
        assert_eq!(Page::new(8, 0).slice(items.clone()), vec![8, 9]);
        assert!(Page::new(20, 5).slice(items).is_empty());
    }

    #[test]
    fn test_stat_ordering() {
        let stat = StatResult::from_buckets(vec![
            StatBucket { key: "USER".into(), count: 1 },
            StatBucket { key: "WORKSPACE_MEMBER".into(), count: 4 },
            StatBucket { key: "DOMAIN_ADMIN".into(), count: 1 },
        ]);
        assert_eq!(stat.total_count, 6);
        assert_eq!(stat.results[0].key, "WORKSPACE_MEMBER");
        assert_eq!(stat.results[1].key, "DOMAIN_ADMIN");
    }
}
