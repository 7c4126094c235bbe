use crate::domain::{
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};
use std::sync::Arc;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for a specific backend
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        match backend {
            SolverBackend::Auto => Self::default_solver(),
            #[cfg(feature = "microlp")]
            SolverBackend::MicroLp => Ok(Arc::new(super::MicroLpSolver::new())),
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => Ok(Arc::new(super::CoinCbcSolver::new())),
            #[cfg(feature = "highs")]
            SolverBackend::Highs => Ok(Arc::new(super::HighsSolver::new())),
            #[allow(unreachable_patterns)]
            other => Err(SolverError::SolverNotAvailable(format!(
                "{} backend was not compiled into this build",
                other
            ))),
        }
    }

    /// The strongest backend available: CBC, then HiGHS, then microlp
    pub fn default_solver() -> Result<Arc<dyn SolverService>> {
        Self::available_backends()
            .first()
            .copied()
            .ok_or_else(|| {
                SolverError::SolverNotAvailable(
                    "no solver backend was compiled into this build".to_string(),
                )
            })
            .and_then(Self::create_from_backend)
    }

    /// Backends compiled into this build, in order of preference
    pub fn available_backends() -> Vec<SolverBackend> {
        let mut backends = Vec::new();
        #[cfg(feature = "coin_cbc")]
        backends.push(SolverBackend::CoinCbc);
        #[cfg(feature = "highs")]
        backends.push(SolverBackend::Highs);
        #[cfg(feature = "microlp")]
        backends.push(SolverBackend::MicroLp);
        backends
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_resolves_to_an_available_backend() {
        let solver = SolverFactory::create_from_backend(SolverBackend::Auto).unwrap();
        assert!(solver.supports_mip());
        assert!(!SolverFactory::available_backends().is_empty());
    }

    #[cfg(feature = "microlp")]
    #[test]
    fn test_microlp_backend() {
        let solver = SolverFactory::create_from_backend(SolverBackend::MicroLp).unwrap();
        assert_eq!(solver.name(), "microlp");
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn test_missing_backend_is_reported() {
        let err = SolverFactory::create_from_backend(SolverBackend::Highs)
            .err()
            .expect("HiGHS is not compiled in");
        assert!(matches!(err, SolverError::SolverNotAvailable(_)));
    }
}
