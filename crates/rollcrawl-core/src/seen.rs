use std::collections::BTreeSet;

/// Outcome of recording a raw ID cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawId {
    /// First time this ID was recorded.
    New(u64),
    /// Already recorded earlier in this process or seeded from disk.
    Seen(u64),
    /// Not a non-negative integer; nothing recorded.
    Invalid,
}

/// Every roll ID already transcribed during this process.
///
/// Append-only: IDs are recorded as rows are emitted and never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenIds {
    ids: BTreeSet<u64>,
}

impl SeenIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an ID. Returns false if it was already present.
    pub fn insert(&mut self, id: u64) -> bool {
        self.ids.insert(id)
    }

    /// Parses a raw ID cell and records it.
    pub fn record_raw(&mut self, raw: &str) -> RawId {
        match raw.trim().parse::<u64>() {
            Ok(id) if self.ids.insert(id) => RawId::New(id),
            Ok(id) => RawId::Seen(id),
            Err(_) => RawId::Invalid,
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }

    /// Smallest ID `>= floor` that has not been seen.
    pub fn lowest_missing(&self, floor: u64) -> u64 {
        let mut expected = floor;
        for &id in self.ids.range(floor..) {
            if id != expected {
                break;
            }
            expected += 1;
        }
        expected
    }
}

impl Extend<u64> for SeenIds {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        self.ids.extend(iter);
    }
}

impl FromIterator<u64> for SeenIds {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
