use std::fmt;
use std::str::FromStr;

use super::error::ReadError;

// ---------------------------------------------------------------------------
// AxisSelector – which projection of a position to return
// ---------------------------------------------------------------------------

/// Requested projection of each record's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSelector {
    All,
    X,
    Y,
    Z,
}

impl AxisSelector {
    /// Component index for single-axis selectors, `None` for [`AxisSelector::All`].
    pub fn component(self) -> Option<usize> {
        match self {
            AxisSelector::All => None,
            AxisSelector::X => Some(0),
            AxisSelector::Y => Some(1),
            AxisSelector::Z => Some(2),
        }
    }
}

impl FromStr for AxisSelector {
    type Err = ReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(AxisSelector::All),
            "x" => Ok(AxisSelector::X),
            "y" => Ok(AxisSelector::Y),
            "z" => Ok(AxisSelector::Z),
            other => Err(ReadError::InvalidAxis(other.to_string())),
        }
    }
}

impl fmt::Display for AxisSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AxisSelector::All => "all",
            AxisSelector::X => "x",
            AxisSelector::Y => "y",
            AxisSelector::Z => "z",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Record / Dataset
// ---------------------------------------------------------------------------

/// One entry of an input source. Only the position is interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub position: [f64; 3],
}

/// Result of projecting a dataset through an [`AxisSelector`].
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Full `(x, y, z)` triples, in source order.
    Points(Vec<[f64; 3]>),
    /// One scalar per record, in source order.
    Axis(Vec<f64>),
}

impl Projection {
    pub fn len(&self) -> usize {
        match self {
            Projection::Points(p) => p.len(),
            Projection::Axis(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Records loaded verbatim from one source.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Source identifier, used as the legend label.
    pub source: String,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(source: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    /// Project every record's position through `selector`.
    pub fn project(&self, selector: AxisSelector) -> Projection {
        match selector.component() {
            None => Projection::Points(self.positions().collect()),
            Some(i) => Projection::Axis(self.positions().map(|p| p[i]).collect()),
        }
    }

    /// Scalars of a single axis. Returns an empty vector for [`AxisSelector::All`].
    pub fn axis(&self, selector: AxisSelector) -> Vec<f64> {
        match self.project(selector) {
            Projection::Axis(values) => values,
            Projection::Points(_) => Vec::new(),
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.records.iter().map(|r| r.position)
    }

    pub fn get(&self, index: usize) -> Option<[f64; 3]> {
        self.records.get(index).map(|r| r.position)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
