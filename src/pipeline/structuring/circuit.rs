use std::sync::atomic::{AtomicU32, Ordering};

/// Consecutive malformed replies before the model is skipped.
pub const DEFAULT_REPAIR_FAILURE_THRESHOLD: u32 = 3;

/// Circuit breaker over response repair.
///
/// Counts consecutive malformed model replies. Once the count reaches the
/// threshold the circuit opens and pipelines go straight to their offline
/// path until [`RepairCircuit::reset`] is called. A successful repair
/// clears the count.
#[derive(Debug)]
pub struct RepairCircuit {
    consecutive_failures: AtomicU32,
    threshold: u32,
}

impl RepairCircuit {
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive_failures: AtomicU32::new(0),
            threshold: threshold.max(1),
        }
    }

    pub fn is_open(&self) -> bool {
        self.consecutive_failures.load(Ordering::Acquire) >= self.threshold
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
    }

    /// Returns true if this failure opened the circuit.
    pub fn record_failure(&self) -> bool {
        let count = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
        if count == self.threshold {
            tracing::warn!(
                failures = count,
                "Repeated malformed LLM responses, skipping the model for this session"
            );
            true
        } else {
            false
        }
    }

    pub fn failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
    }
}

impl Default for RepairCircuit {
    fn default() -> Self {
        Self::new(DEFAULT_REPAIR_FAILURE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_at_threshold() {
        let circuit = RepairCircuit::default();
        assert!(!circuit.record_failure());
        assert!(!circuit.record_failure());
        assert!(!circuit.is_open());
        assert!(circuit.record_failure());
        assert!(circuit.is_open());
        // Further failures do not re-report opening
        assert!(!circuit.record_failure());
    }

    #[test]
    fn success_clears_count() {
        let circuit = RepairCircuit::default();
        circuit.record_failure();
        circuit.record_failure();
        circuit.record_success();
        circuit.record_failure();
        assert!(!circuit.is_open());
        assert_eq!(circuit.failures(), 1);
    }

    #[test]
    fn reset_closes() {
        let circuit = RepairCircuit::new(1);
        circuit.record_failure();
        assert!(circuit.is_open());
        circuit.reset();
        assert!(!circuit.is_open());
    }

    #[test]
    fn zero_threshold_clamped() {
        let circuit = RepairCircuit::new(0);
        assert!(!circuit.is_open());
        assert!(circuit.record_failure());
    }
}
