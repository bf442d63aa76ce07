//! Node addressing by first/second choices from the root.

use std::fmt;

/// One step of a path: which child of a split to descend into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    First,
    Second,
}

impl Branch {
    /// `0` for first, `1` for second
    pub fn index(self) -> u8 {
        match self {
            Branch::First => 0,
            Branch::Second => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Branch::First),
            1 => Some(Branch::Second),
            _ => None,
        }
    }
}

/// Address of a node in a layout tree. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LayoutPath(Vec<Branch>);

impl LayoutPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from a 0/1 choice sequence; any other value is rejected
    pub fn from_indices(indices: &[u8]) -> Option<Self> {
        indices
            .iter()
            .map(|&i| Branch::from_index(i))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn branches(&self) -> &[Branch] {
        &self.0
    }

    /// Path extended by one step
    pub fn child(&self, branch: Branch) -> Self {
        let mut steps = self.0.clone();
        steps.push(branch);
        Self(steps)
    }

    /// Path with the last step removed (`None` for the root)
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }
}

impl From<Vec<Branch>> for LayoutPath {
    fn from(steps: Vec<Branch>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for LayoutPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "[root]");
        }
        write!(f, "[")?;
        for step in &self.0 {
            write!(f, "{}", step.index())?;
        }
        write!(f, "]")
    }
}
