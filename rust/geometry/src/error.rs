// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building floor geometry
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Degenerate zone: {0} vertices, at least 3 are required")]
    DegenerateZone(usize),

    #[error("Non-finite coordinate in {0}")]
    NonFiniteCoordinate(&'static str),

    #[error("Singular matrix: {0}")]
    SingularMatrix(&'static str),
}
