//! Two-channel conversion pairing
//!
//! The sine and cosine channels are converted by two ADCs started together.
//! Their end-of-conversion events arrive separately; the latch hands out a
//! pair only when both results of the current conversion are present.

/// Raw resolver reading of one simultaneous conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplePair {
    /// Sine channel (A)
    pub a: u16,
    /// Cosine channel (B)
    pub b: u16,
}

impl SamplePair {
    pub const fn new(a: u16, b: u16) -> Self {
        Self { a, b }
    }
}

/// Resolver channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResolverChannel {
    /// Sine channel
    A,
    /// Cosine channel
    B,
}

/// Collects the two channel results of one conversion
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionLatch {
    a: Option<u16>,
    b: Option<u16>,
}

impl ConversionLatch {
    pub const fn new() -> Self {
        Self { a: None, b: None }
    }

    /// Record one channel result
    ///
    /// # Returns
    /// The complete pair once both channels are present; the latch is then
    /// empty again. A second result on the same channel replaces the first.
    pub fn complete(&mut self, channel: ResolverChannel, value: u16) -> Option<SamplePair> {
        match channel {
            ResolverChannel::A => self.a = Some(value),
            ResolverChannel::B => self.b = Some(value),
        }

        match (self.a, self.b) {
            (Some(a), Some(b)) => {
                self.clear();
                Some(SamplePair { a, b })
            }
            _ => None,
        }
    }

    /// Record whichever results one end-of-conversion event delivered
    ///
    /// Both converters share an interrupt, so one event may carry either
    /// channel, both, or neither.
    pub fn complete_any(&mut self, a: Option<u16>, b: Option<u16>) -> Option<SamplePair> {
        let mut pair = None;
        if let Some(value) = a {
            pair = self.complete(ResolverChannel::A, value);
        }
        if let Some(value) = b {
            pair = pair.or(self.complete(ResolverChannel::B, value));
        }
        pair
    }

    /// Drop a half-complete conversion
    pub fn clear(&mut self) {
        self.a = None;
        self.b = None;
    }
}
