//! Error types.
//!
//! Two layers:
//! - `FitError`: what the fitting core can fail with (typed, matchable)
//! - `AppError`: what the binary reports (message + process exit code)

/// Fatal conditions raised by the parse/expand/fit core.
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("failed to {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("table read error: {0}")]
    Table(#[from] csv::Error),

    #[error("no valid points to fit (all points have y <= 0, lie outside the fit domain, or carry non-finite values)")]
    EmptyDataset,

    #[error("fit undetermined: {points} valid point(s) for {params} free parameter(s); need at least {}", .params + 1)]
    Underdetermined { points: usize, params: usize },

    #[error(
        "fit did not converge after {iterations} iteration(s) (last chi2={chi2:.6}, params={params:?})"
    )]
    NonConvergence {
        iterations: usize,
        chi2: f64,
        params: Vec<f64>,
    },

    #[error("covariance matrix is singular at the optimum; parameter errors are undefined")]
    SingularCovariance,
}

impl FitError {
    pub fn io(action: &'static str, path: &std::path::Path, source: std::io::Error) -> Self {
        FitError::Io {
            action,
            path: path.display().to_string(),
            source,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let exit_code = match &err {
            FitError::Io { .. } | FitError::Table(_) => 2,
            FitError::EmptyDataset | FitError::Underdetermined { .. } => 3,
            FitError::NonConvergence { .. } | FitError::SingularCovariance => 4,
        };
        AppError::new(exit_code, format!("Error: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
