// ---------------------------------------------------------------------------
// GridError: typed failures for generation and simulation calls
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors raised by heightfield generation and fluid operations.
///
/// Every fallible call returns one of these instead of committing a partial
/// or corrupt grid; the caller keeps its previous state.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Side length is not `2^k + 1` (or is smaller than 3).
    InvalidDimensions { size: usize },
    /// Two grids that must be co-located differ in size.
    DimensionMismatch { expected: usize, found: usize },
    /// Cell coordinates outside the grid.
    OutOfBounds { x: usize, z: usize },
    /// Operation targeted a fluid boundary cell.
    BoundaryCell { x: usize, z: usize },
    /// A NaN or infinite height was produced.
    NonFiniteHeight { x: usize, z: usize },
    /// A vertex normal had zero length.
    DegenerateNormal { x: usize, z: usize },
}

pub type GridResult<T> = Result<T, GridError>;

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidDimensions { size } => {
                write!(f, "Invalid grid size {size}: expected 2^k + 1 with k >= 1")
            }
            GridError::DimensionMismatch { expected, found } => {
                write!(f, "Grid size mismatch: expected {expected}, found {found}")
            }
            GridError::OutOfBounds { x, z } => write!(f, "Cell ({x}, {z}) is out of bounds"),
            GridError::BoundaryCell { x, z } => {
                write!(f, "Cell ({x}, {z}) is a boundary cell")
            }
            GridError::NonFiniteHeight { x, z } => {
                write!(f, "Non-finite height at cell ({x}, {z})")
            }
            GridError::DegenerateNormal { x, z } => {
                write!(f, "Zero-length normal at cell ({x}, {z})")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Returns true when `size` is `2^k + 1` for some `k >= 1`.
pub fn is_valid_fractal_size(size: usize) -> bool {
    size >= 3 && (size - 1).is_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_error_display_invalid_dimensions() {
        let err = GridError::InvalidDimensions { size: 100 };
        assert_eq!(
            err.to_string(),
            "Invalid grid size 100: expected 2^k + 1 with k >= 1"
        );
    }

    #[test]
    fn test_grid_error_display_mismatch() {
        let err = GridError::DimensionMismatch {
            expected: 129,
            found: 65,
        };
        let msg = err.to_string();
        assert!(msg.contains("129"));
        assert!(msg.contains("65"));
    }

    #[test]
    fn test_grid_error_display_boundary() {
        let err = GridError::BoundaryCell { x: 0, z: 7 };
        assert_eq!(err.to_string(), "Cell (0, 7) is a boundary cell");
    }

    #[test]
    fn test_grid_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(GridError::DegenerateNormal { x: 1, z: 2 });
        assert!(err.to_string().contains("Zero-length normal"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_valid_fractal_sizes() {
        for size in [3, 5, 9, 17, 33, 65, 129, 257] {
            assert!(is_valid_fractal_size(size), "{size} should be valid");
        }
        for size in [0, 1, 2, 4, 6, 64, 100, 128, 130] {
            assert!(!is_valid_fractal_size(size), "{size} should be invalid");
        }
    }
}
