//! Domain entities: datasets, blocks, output lists

use std::collections::VecDeque;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use itertools::Itertools;
use rand::Rng;

use crate::domain::error::{DomainError, DomainResult};

/// Which sorting algorithm a session animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    #[default]
    Bubble,
    Tree,
}

impl Algorithm {
    /// Short name used on the command line and in the interactive session.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Tree => "tree",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = DomainError;

    /// Accepts the short names plus the selector labels of the web page
    /// ("Сортировка пузырьком" is the bubble option, anything tree-ish the other).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bubble" | "bubble-sort" | "сортировка пузырьком" => Ok(Algorithm::Bubble),
            "tree" | "bst" | "tree-sort" | "сортировка бинарным деревом" => Ok(Algorithm::Tree),
            other => Err(DomainError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Visual tone of an element. Surfaces decide the concrete color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Resting block color
    Default,
    /// Blocks under comparison, right-branch tree nodes
    Selected,
    /// Settled blocks, left-branch tree nodes
    Resolved,
    /// Consumed "before" slots and emitted output items
    Visited,
    /// Insert path links and freshly inserted nodes
    Alert,
    /// Links off the insert path
    Muted,
    /// Nodes already moved to the output
    Extracted,
}

/// Color state of a bubble sort block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockState {
    #[default]
    Default,
    Selected,
    Resolved,
}

impl BlockState {
    pub fn tone(self) -> Tone {
        match self {
            BlockState::Default => Tone::Default,
            BlockState::Selected => Tone::Selected,
            BlockState::Resolved => Tone::Resolved,
        }
    }
}

/// Stable identity of a block: the index it was created at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One dataset value drawn as a bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub value: i32,
    /// Horizontal offset of the bar
    pub left: f64,
    pub width: f64,
    /// Current height; grows from zero when the block is rendered
    pub height: f64,
    pub state: BlockState,
}

/// Bounds for randomly generated datasets (both ranges inclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetShape {
    count: RangeInclusive<usize>,
    value: RangeInclusive<i32>,
}

impl Default for DatasetShape {
    fn default() -> Self {
        Self {
            count: 15..=30,
            value: 0..=100,
        }
    }
}

impl DatasetShape {
    pub fn new(count: RangeInclusive<usize>, value: RangeInclusive<i32>) -> DomainResult<Self> {
        if count.is_empty() || *count.start() == 0 {
            return Err(DomainError::InvalidRange {
                what: "count",
                min: *count.start() as i64,
                max: *count.end() as i64,
            });
        }
        if value.is_empty() {
            return Err(DomainError::InvalidRange {
                what: "value",
                min: i64::from(*value.start()),
                max: i64::from(*value.end()),
            });
        }
        Ok(Self { count, value })
    }

    pub fn count(&self) -> &RangeInclusive<usize> {
        &self.count
    }

    pub fn value(&self) -> &RangeInclusive<i32> {
        &self.value
    }
}

/// Ordered integers to be sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    values: Vec<i32>,
}

impl Dataset {
    pub fn new(values: Vec<i32>) -> Self {
        Self { values }
    }

    /// Draw a fresh dataset: the count and every value are uniform over the shape's ranges.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, shape: &DatasetShape) -> Self {
        let count = rng.random_range(shape.count.clone());
        let values = (0..count)
            .map(|_| rng.random_range(shape.value.clone()))
            .collect();
        Self { values }
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values.iter().join(", "))
    }
}

impl FromStr for Dataset {
    type Err = DomainError;

    /// Parse a comma or whitespace separated list such as `5,3,8,1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i32>()
                    .map_err(|_| DomainError::InvalidValue(part.to_string()))
            })
            .collect::<DomainResult<Vec<_>>>()?;
        if values.is_empty() {
            return Err(DomainError::EmptyDataset);
        }
        Ok(Self { values })
    }
}

/// Where a value lands in the output list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Front,
    Back,
}

/// The "after" list that sorted values are moved into.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputList {
    items: VecDeque<i32>,
}

impl OutputList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, value: i32, placement: Placement) {
        match placement {
            Placement::Front => self.items.push_front(value),
            Placement::Back => self.items.push_back(value),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn to_vec(&self) -> Vec<i32> {
        self.items.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn given_seeded_rng_when_generate_then_respects_default_shape() {
        let shape = DatasetShape::default();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let dataset = Dataset::generate(&mut rng, &shape);
            assert!((15..=30).contains(&dataset.len()), "len {}", dataset.len());
            assert!(dataset.values().iter().all(|v| (0..=100).contains(v)));
        }
    }

    #[test]
    fn given_same_seed_when_generate_then_datasets_match() {
        let shape = DatasetShape::default();
        let a = Dataset::generate(&mut StdRng::seed_from_u64(7), &shape);
        let b = Dataset::generate(&mut StdRng::seed_from_u64(7), &shape);
        assert_eq!(a, b);
    }

    #[test]
    fn given_list_when_parse_dataset_then_keeps_order() {
        let dataset: Dataset = "5, 3,8  1".parse().unwrap();
        assert_eq!(dataset.values(), &[5, 3, 8, 1]);
        assert_eq!(dataset.to_string(), "5, 3, 8, 1");
    }

    #[test]
    fn given_garbage_when_parse_dataset_then_reports_value() {
        let err = "5,x,1".parse::<Dataset>().unwrap_err();
        assert_eq!(err, DomainError::InvalidValue("x".to_string()));
        assert_eq!(" , ".parse::<Dataset>().unwrap_err(), DomainError::EmptyDataset);
    }

    #[test]
    fn given_inverted_range_when_new_shape_then_rejected() {
        assert!(DatasetShape::new(30..=15, 0..=100).is_err());
        assert!(DatasetShape::new(0..=3, 0..=100).is_err());
        assert!(DatasetShape::new(1..=3, 10..=0).is_err());
        assert!(DatasetShape::new(1..=1, 5..=5).is_ok());
    }

    #[test]
    fn given_labels_when_parse_algorithm_then_maps_both_modes() {
        assert_eq!("bubble".parse::<Algorithm>().unwrap(), Algorithm::Bubble);
        assert_eq!("Сортировка пузырьком".parse::<Algorithm>().unwrap(), Algorithm::Bubble);
        assert_eq!(" TREE ".parse::<Algorithm>().unwrap(), Algorithm::Tree);
        assert!("quick".parse::<Algorithm>().is_err());
    }

    #[test]
    fn given_front_and_back_when_place_then_order_follows_placement() {
        let mut out = OutputList::new();
        out.place(8, Placement::Front);
        out.place(5, Placement::Front);
        out.place(9, Placement::Back);
        assert_eq!(out.to_vec(), vec![5, 8, 9]);
    }
}
