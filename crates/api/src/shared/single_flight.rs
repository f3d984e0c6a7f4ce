use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Allows at most one execution of an operation to be in flight.
/// Attempts while one is in flight are rejected, never queued.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    in_flight: Arc<AtomicBool>,
}

/// Marks the operation as in flight until dropped
#[derive(Debug)]
pub struct SingleFlightPermit {
    in_flight: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<SingleFlightPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SingleFlightPermit {
                in_flight: self.in_flight.clone(),
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for SingleFlightPermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_while_in_flight() {
        let flight = SingleFlight::new();
        let permit = flight.try_acquire().expect("First acquire to succeed");
        assert!(flight.is_in_flight());
        assert!(flight.try_acquire().is_none());
        assert!(flight.clone().try_acquire().is_none());

        drop(permit);
        assert!(!flight.is_in_flight());
        assert!(flight.try_acquire().is_some());
    }
}
