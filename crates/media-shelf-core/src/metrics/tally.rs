use std::collections::HashMap;

/// Per-key accumulators for one aggregation dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bucket {
    /// Titles carrying this key.
    pub count: u32,
    /// Unweighted sum of user ratings.
    pub rating_sum: f64,
    /// Rating sum with lead billing weighted double (actors only; equals
    /// `rating_sum` for every other dimension).
    pub balanced_sum: f64,
    /// Titles rated at or above the blockbuster threshold.
    pub blockbusters: u32,
    /// Titles that count toward the minimum sample size.
    pub samples: u32,
}

impl Bucket {
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.rating_sum / self.count as f64
        }
    }
}

/// Keyed buckets that remember first-seen key order, so ties keep a stable,
/// input-driven order once sorted.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    keys: Vec<String>,
    index: HashMap<String, usize>,
    buckets: Vec<Bucket>,
}

impl Tally {
    pub fn entry(&mut self, key: &str) -> &mut Bucket {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.keys.len();
                self.keys.push(key.to_string());
                self.index.insert(key.to_string(), idx);
                self.buckets.push(Bucket::default());
                idx
            }
        };
        &mut self.buckets[idx]
    }

    /// Count one title under `key` with the given rating weight.
    pub fn add(&mut self, key: &str, rating: f64, weight: f64, blockbuster: bool) -> &mut Bucket {
        let bucket = self.entry(key);
        bucket.count += 1;
        bucket.samples += 1;
        bucket.rating_sum += rating;
        bucket.balanced_sum += rating * weight;
        if blockbuster {
            bucket.blockbusters += 1;
        }
        bucket
    }

    pub fn get(&self, key: &str) -> Option<&Bucket> {
        self.index.get(key).map(|&idx| &self.buckets[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bucket)> {
        self.keys.iter().map(String::as_str).zip(self.buckets.iter())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_keeps_first_seen_order() {
        let mut tally = Tally::default();
        tally.add("Drama", 4.0, 1.0, false);
        tally.add("Comedy", 2.0, 1.0, false);
        tally.add("Drama", 5.0, 1.0, true);

        let keys: Vec<&str> = tally.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Drama", "Comedy"]);

        let drama = tally.get("Drama").unwrap();
        assert_eq!(drama.count, 2);
        assert_eq!(drama.rating_sum, 9.0);
        assert_eq!(drama.blockbusters, 1);
        assert_eq!(drama.average(), 4.5);
    }

    #[test]
    fn test_balanced_weight() {
        let mut tally = Tally::default();
        tally.add("Lead", 4.0, 2.0, false);
        let lead = tally.get("Lead").unwrap();
        assert_eq!(lead.rating_sum, 4.0);
        assert_eq!(lead.balanced_sum, 8.0);
    }
}
