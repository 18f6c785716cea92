//! Remote-execution collaborator interface.

use anyhow::Result;

use crate::model::{FormParams, JobModel};

/// A connection to the automation server, as far as the scheduler is
/// concerned.
///
/// Supplied (and swapped on server switch) by the host's connection layer.
/// The scheduler issues exactly one build call per firing and treats any
/// error as non-fatal: it is logged and recorded, never retried.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Request a build of `job` with the captured form parameters.
    async fn build_job_with_parameter(&self, job: &JobModel, params: &FormParams) -> Result<()>;
}
