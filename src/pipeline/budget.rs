// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use crate::error::{Result, XcsgError};

/// Ceiling on the number of boolean nodes a model may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationBudget {
    max_bool: usize,
}

impl OperationBudget {
    pub const DEFAULT_MAX_BOOL: usize = 10_000;

    pub fn new(max_bool: usize) -> Self {
        Self { max_bool }
    }

    pub fn max_bool(&self) -> usize {
        self.max_bool
    }

    /// Fails when `nbool` is above the ceiling; equal is allowed
    pub fn check(&self, nbool: usize) -> Result<()> {
        if nbool > self.max_bool {
            return Err(XcsgError::BudgetExceeded {
                limit: self.max_bool,
                requested: nbool,
            });
        }
        Ok(())
    }
}

impl Default for OperationBudget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_BOOL)
    }
}
