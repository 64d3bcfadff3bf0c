use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("height field is {actual}x{actual} but the patch layout needs {expected}x{expected}")]
    FieldSizeMismatch { expected: usize, actual: usize },
    #[error("terrain of {vertices} vertices does not fit 32-bit indices")]
    TooManyVertices { vertices: usize },
}
