use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovmergeError {
    #[error("length of 'line_coverage' ({line_coverage}) and 'line_visit_status' ({line_visit_status}) must match")]
    CoverageLengthMismatch {
        line_coverage: usize,
        line_visit_status: usize,
    },
}

pub type Result<T> = std::result::Result<T, CovmergeError>;
