// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Evaluation pipeline: locate, budget, boolean evaluation, manifold post-processing

mod boolean2d;
mod boolean3d;
mod budget;
mod locate;
mod manifold;
mod progress;

pub use boolean2d::{evaluate_shape, ProfileResult};
pub use boolean3d::{evaluate_solid, BooleanResult};
pub use budget::OperationBudget;
pub use locate::{locate, Located};
pub use manifold::post_process;
pub use progress::{NullSink, ProgressEvent, ProgressSink, RecordingSink};
