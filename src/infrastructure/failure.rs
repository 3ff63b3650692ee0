// Failure strategies for source assertions.
//
// `HardFailure` aborts the enclosing test; `VerifyingFailure` hands the
// failure back so the caller can assert on the message itself.

use tracing::debug;

use crate::domain::error::VerificationFailure;
use crate::ports::FailureStrategy;

pub struct HardFailure;

impl FailureStrategy for HardFailure {
    fn fail(&self, failure: VerificationFailure) -> Result<(), VerificationFailure> {
        panic!("{}", failure.message);
    }
}

pub struct VerifyingFailure;

impl FailureStrategy for VerifyingFailure {
    fn fail(&self, failure: VerificationFailure) -> Result<(), VerificationFailure> {
        debug!(kind = ?failure.kind, "verification failed");
        Err(failure)
    }
}
