//! Core Types for Resource Accounting

use serde::{Deserialize, Serialize};
use std::fmt;

/// Count of resource instances
pub type Units = u32;

/// Default upper bound on the number of processes
pub const MAX_PROCESSES: usize = 10;

/// Default upper bound on the number of resource types
pub const MAX_RESOURCES: usize = 10;

/// Process identifier (row index in every matrix)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub usize);

impl ProcessId {
    /// Create a new process identifier
    #[inline(always)]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the underlying usize value
    #[inline(always)]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Resource type identifier (column index in every matrix)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceTypeId(pub usize);

impl ResourceTypeId {
    /// Create a new resource type identifier
    #[inline(always)]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the underlying usize value
    #[inline(always)]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for ResourceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Process lifecycle as seen by the resource model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessStatus {
    /// Still needs at least one unit of some resource type
    Active,
    /// Holds everything it declared; only releases remain
    Satisfied,
    /// Terminated by the resolution policy; row is inert
    Terminated,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Satisfied => "satisfied",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
