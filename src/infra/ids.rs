//! Random identifier and token generation.

use dashmap::DashSet;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::debug;

use crate::domain::{IdGenerator, PROOF_LENGTH, SIGNATURE_LENGTH};

/// Length of the random part of an identifier
pub const ID_SUFFIX_LENGTH: usize = 13;

/// Alphanumeric generator backed by the thread-local CSPRNG.
///
/// Identifiers are remembered so the same generator never hands one out twice.
#[derive(Debug, Default)]
pub struct RandomIdGenerator {
    issued: DashSet<String>,
}

impl RandomIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers handed out so far
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

fn random_alphanumeric(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

impl IdGenerator for RandomIdGenerator {
    fn identifier(&self, prefix: &str) -> String {
        loop {
            let candidate = format!("{}_{}", prefix, random_alphanumeric(ID_SUFFIX_LENGTH));
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
            debug!(id = %candidate, "Identifier collision, drawing again");
        }
    }

    fn proof_token(&self) -> String {
        random_alphanumeric(PROOF_LENGTH)
    }

    fn signature_token(&self) -> String {
        random_alphanumeric(SIGNATURE_LENGTH)
    }
}
