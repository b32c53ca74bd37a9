use std::collections::BTreeSet;

use foundation::{Age, AssetId};
use once_cell::sync::OnceCell;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochEntry {
    pub age: Age,
    pub asset: AssetId,
    /// Optional display name, e.g. "Jurassic".
    pub name: Option<String>,
}

impl EpochEntry {
    pub fn new(age: Age, asset: impl Into<AssetId>) -> Self {
        Self {
            age,
            asset: asset.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    Empty,
    DuplicateAge(Age),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::Empty => write!(f, "invalid epoch table: no entries"),
            TableError::DuplicateAge(age) => {
                write!(f, "invalid epoch table: duplicate age {age}")
            }
        }
    }
}

impl std::error::Error for TableError {}

/// Ascending view over the table, built lazily once.
#[derive(Debug, Clone)]
struct SortedIndex {
    ages: Vec<Age>,
    /// `order[i]` is the entry index holding `ages[i]`.
    order: Vec<usize>,
}

/// Immutable sparse mapping from age to asset.
///
/// Entries keep their insertion order; sorted traversal goes through a cached
/// index. A constructed table is never empty, so the smallest key always acts as
/// the floor entry for queries below every key.
#[derive(Debug, Clone)]
pub struct EpochTable {
    entries: Vec<EpochEntry>,
    sorted: OnceCell<SortedIndex>,
}

impl EpochTable {
    pub fn new(entries: impl IntoIterator<Item = EpochEntry>) -> Result<Self, TableError> {
        let entries: Vec<EpochEntry> = entries.into_iter().collect();
        if entries.is_empty() {
            return Err(TableError::Empty);
        }

        let mut seen = BTreeSet::new();
        for e in &entries {
            if !seen.insert(e.age) {
                return Err(TableError::DuplicateAge(e.age));
            }
        }

        Ok(Self {
            entries,
            sorted: OnceCell::new(),
        })
    }

    /// Convenience for `(age, asset)` pairs without names.
    pub fn from_pairs<A: Into<AssetId>>(
        pairs: impl IntoIterator<Item = (i32, A)>,
    ) -> Result<Self, TableError> {
        Self::new(
            pairs
                .into_iter()
                .map(|(age, asset)| EpochEntry::new(Age(age), asset)),
        )
    }

    pub fn builder() -> EpochTableBuilder {
        EpochTableBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[EpochEntry] {
        &self.entries
    }

    /// Ages in ascending order.
    pub fn sorted_ages(&self) -> &[Age] {
        &self.index().ages
    }

    pub fn min_age(&self) -> Option<Age> {
        self.sorted_ages().first().copied()
    }

    pub fn max_age(&self) -> Option<Age> {
        self.sorted_ages().last().copied()
    }

    /// Entries in ascending age order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &EpochEntry> {
        self.index().order.iter().map(|&i| &self.entries[i])
    }

    /// Entry with exactly this age, if any.
    pub fn entry_at(&self, age: Age) -> Option<&EpochEntry> {
        let index = self.index();
        let pos = index.ages.binary_search(&age).ok()?;
        Some(&self.entries[index.order[pos]])
    }

    pub fn name_for(&self, age: Age) -> Option<&str> {
        self.entry_at(age)?.name.as_deref()
    }

    /// Asset valid "as of" `age` under the nearest-below rule.
    pub fn asset_for(&self, age: Age) -> &AssetId {
        &self.floor_entry(age).asset
    }

    /// Greatest key `<= age`, or the smallest key when `age` is below every key.
    pub(crate) fn floor_entry(&self, age: Age) -> &EpochEntry {
        let index = self.index();
        let below_or_equal = index.ages.partition_point(|k| *k <= age);
        let pos = below_or_equal.saturating_sub(1);
        &self.entries[index.order[pos]]
    }

    /// Key minimizing `|k - age|`; equidistant keys resolve to the smaller one.
    pub(crate) fn nearest_entry(&self, age: Age) -> &EpochEntry {
        let index = self.index();
        let ages = &index.ages;
        let above = ages.partition_point(|k| *k < age);

        let pos = if above == 0 {
            0
        } else if above == ages.len() {
            ages.len() - 1
        } else {
            let lo = above - 1;
            // `<=` keeps the older (smaller) key on exact ties.
            if ages[lo].distance(age) <= ages[above].distance(age) {
                lo
            } else {
                above
            }
        };
        &self.entries[index.order[pos]]
    }

    fn index(&self) -> &SortedIndex {
        self.sorted.get_or_init(|| {
            let mut order: Vec<usize> = (0..self.entries.len()).collect();
            order.sort_by_key(|&i| self.entries[i].age);
            let ages = order.iter().map(|&i| self.entries[i].age).collect();
            SortedIndex { ages, order }
        })
    }
}

impl PartialEq for EpochTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for EpochTable {}

/// Append-only setup phase for an [`EpochTable`].
#[derive(Debug, Default, Clone)]
pub struct EpochTableBuilder {
    entries: Vec<EpochEntry>,
}

impl EpochTableBuilder {
    pub fn push(&mut self, entry: EpochEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    pub fn epoch(mut self, age: i32, asset: impl Into<AssetId>) -> Self {
        self.entries.push(EpochEntry::new(Age(age), asset));
        self
    }

    pub fn named_epoch(mut self, age: i32, asset: impl Into<AssetId>, name: &str) -> Self {
        self.entries.push(EpochEntry::new(Age(age), asset).with_name(name));
        self
    }

    pub fn build(self) -> Result<EpochTable, TableError> {
        EpochTable::new(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::{EpochEntry, EpochTable, TableError};
    use foundation::{Age, AssetId};
    use pretty_assertions::assert_eq;

    fn table() -> EpochTable {
        EpochTable::from_pairs([(250, "pangaea"), (0, "present"), (100, "jurassic")])
            .expect("table")
    }

    #[test]
    fn rejects_empty_tables() {
        let err = EpochTable::new(Vec::<EpochEntry>::new()).unwrap_err();
        assert_eq!(err, TableError::Empty);
    }

    #[test]
    fn rejects_duplicate_ages() {
        let err = EpochTable::from_pairs([(0, "a"), (66, "b"), (0, "c")]).unwrap_err();
        assert_eq!(err, TableError::DuplicateAge(Age(0)));
        assert_eq!(err.to_string(), "invalid epoch table: duplicate age 0 Ma");
    }

    #[test]
    fn sorted_ages_ignore_insertion_order() {
        let t = table();
        assert_eq!(t.sorted_ages(), &[Age(0), Age(100), Age(250)]);
        // Second call hits the cached index.
        assert_eq!(t.sorted_ages().as_ptr(), t.sorted_ages().as_ptr());
        assert_eq!(t.min_age(), Some(Age(0)));
        assert_eq!(t.max_age(), Some(Age(250)));

        let sorted: Vec<&str> = t.iter_sorted().map(|e| e.asset.as_str()).collect();
        assert_eq!(sorted, vec!["present", "jurassic", "pangaea"]);
    }

    #[test]
    fn asset_for_uses_floor_and_clamps_below_minimum() {
        let t = EpochTable::from_pairs([(-600, "future"), (0, "present"), (250, "pangaea")])
            .expect("table");
        assert_eq!(t.asset_for(Age(-900)), &AssetId::new("future"));
        assert_eq!(t.asset_for(Age(-1)), &AssetId::new("future"));
        assert_eq!(t.asset_for(Age(0)), &AssetId::new("present"));
        assert_eq!(t.asset_for(Age(249)), &AssetId::new("present"));
        assert_eq!(t.asset_for(Age(10_000)), &AssetId::new("pangaea"));
    }

    #[test]
    fn builder_keeps_names() {
        let t = EpochTable::builder()
            .named_epoch(150, "150_jurassic.jpg", "Jurassic")
            .epoch(0, "0_present.jpg")
            .build()
            .expect("table");
        assert_eq!(t.name_for(Age(150)), Some("Jurassic"));
        assert_eq!(t.name_for(Age(0)), None);
        assert!(t.entry_at(Age(149)).is_none());
    }

    #[test]
    fn single_entry_table_resolves_everything_to_it() {
        let t = EpochTable::from_pairs([(66, "only")]).expect("table");
        for q in [-1000, 0, 66, 67, 5000] {
            assert_eq!(t.asset_for(Age(q)).as_str(), "only");
            assert_eq!(t.nearest_entry(Age(q)).asset.as_str(), "only");
        }
    }
}
