use anyhow::Result;

use crate::keti::Reading;

/// Receives every reading that survives deduplication.
pub trait ReadingSink {
    fn reading_received(&mut self, reading: Reading) -> Result<()>;
}

impl ReadingSink for Vec<Reading> {
    fn reading_received(&mut self, reading: Reading) -> Result<()> {
        self.push(reading);
        Ok(())
    }
}

impl<S: ReadingSink + ?Sized> ReadingSink for &mut S {
    fn reading_received(&mut self, reading: Reading) -> Result<()> {
        (**self).reading_received(reading)
    }
}

impl<S: ReadingSink + ?Sized> ReadingSink for Box<S> {
    fn reading_received(&mut self, reading: Reading) -> Result<()> {
        (**self).reading_received(reading)
    }
}
