//! Error types for the exporter.

use std::process::ExitStatus;
use thiserror::Error;

/// Everything that can go wrong during a poll cycle.
///
/// All of these are fatal: the scheduler turns any of them into a process
/// exit. There is no retry and no partial-result fallback.
#[derive(Error, Debug)]
pub enum PollError {
    #[error("failed to run lifepo4wered-cli: {0}")]
    Invocation(#[from] std::io::Error),

    #[error("lifepo4wered-cli exited with {status}: {stderr}")]
    ProducerFailed { status: ExitStatus, stderr: String },

    #[error("malformed line in lifepo4wered-cli output: {0:?}")]
    MalformedLine(String),
}
