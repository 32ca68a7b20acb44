use super::NoiseOperation;
use crate::error::Error;
use crate::jitter::{JitterBackend, JitterCollector};

/// Reads 8 bytes from a borrowed jitter collector into the slot.
/// The collector opens itself on first use; short reads are errors.
pub struct HardwareJitter<'a, B: JitterBackend> {
    collector: &'a mut JitterCollector<B>,
}

impl<'a, B: JitterBackend> HardwareJitter<'a, B> {
    pub fn new(collector: &'a mut JitterCollector<B>) -> Self {
        Self { collector }
    }
}

impl<B: JitterBackend> NoiseOperation for HardwareJitter<'_, B> {
    fn name(&self) -> &'static str {
        "hardware-jitter"
    }

    #[inline(never)]
    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error> {
        *slot = self.collector.read_u64()?;
        Ok(())
    }
}
