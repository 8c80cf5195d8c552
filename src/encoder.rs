//! Quadrature decoder for the pitch encoder
//!
//! Turns raw two-bit pin samples into signed detent steps. Every transition is
//! looked up in a fixed 16-entry table, so contact bounce and skipped states
//! resolve to a zero delta instead of a spurious click.

/// Number of accumulated edges that make one physical detent
pub const EDGES_PER_DETENT: i32 = 4;

/// Edge delta per transition, indexed by `(previous << 2) | current`
const TRANSITIONS: [i8; 16] = [
    0, -1, 1, 0, //
    1, 0, 0, -1, //
    -1, 0, 0, 1, //
    0, 1, -1, 0, //
];

/// One reading of the two encoder signals, packed as `(A << 1) | B`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncoderSample(u8);

impl EncoderSample {
    /// Both pins pulled high: the resting state of the encoder
    pub const IDLE: EncoderSample = EncoderSample(0b11);

    /// Build a sample from the two pin levels
    pub fn new(a: bool, b: bool) -> Self {
        Self(((a as u8) << 1) | b as u8)
    }

    /// Raw packed bits (0-3)
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn a(self) -> bool {
        self.0 & 0b10 != 0
    }

    pub fn b(self) -> bool {
        self.0 & 0b01 != 0
    }
}

impl Default for EncoderSample {
    fn default() -> Self {
        Self::IDLE
    }
}

impl TryFrom<u8> for EncoderSample {
    type Error = u8;

    /// Accepts only two-bit values; anything wider is handed back unchanged
    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        if raw <= 0b11 {
            Ok(Self(raw))
        } else {
            Err(raw)
        }
    }
}

/// Rotation direction of a single detent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Clockwise (raises pitch)
    Up,
    /// Counter-clockwise (lowers pitch)
    Down,
}

impl Direction {
    /// +1 for `Up`, -1 for `Down`
    pub fn sign(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Edge delta for a transition between two raw samples
///
/// Total over every input: values wider than two bits decode to 0.
pub fn decode(previous: u8, current: u8) -> i8 {
    if previous > 0b11 || current > 0b11 {
        return 0;
    }
    TRANSITIONS[((previous << 2) | current) as usize]
}

/// Detents produced by one decoder update, yielded in the order they fired
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Detents {
    direction: Option<Direction>,
    remaining: u32,
}

impl Detents {
    fn new(direction: Direction, count: u32) -> Self {
        Self {
            direction: Some(direction),
            remaining: count,
        }
    }

    /// No detent fired
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

impl Iterator for Detents {
    type Item = Direction;

    fn next(&mut self) -> Option<Direction> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.direction
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Detents {}

/// Decoder state: last sample seen plus partial progress toward the next detent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadratureDecoder {
    previous: EncoderSample,
    accumulator: i32,
}

impl QuadratureDecoder {
    /// Create a decoder assuming the encoder rests at the idle sample
    pub fn new() -> Self {
        Self::with_initial(EncoderSample::IDLE)
    }

    /// Create a decoder seeded with the sample read at power-up
    pub fn with_initial(sample: EncoderSample) -> Self {
        Self {
            previous: sample,
            accumulator: 0,
        }
    }

    /// Feed the sample read this poll
    pub fn poll(&mut self, current: EncoderSample) -> Detents {
        let delta = decode(self.previous.bits(), current.bits());
        self.previous = current;
        self.accumulate(delta as i32)
    }

    /// Feed a raw pin byte; out-of-range values count as no movement and
    /// leave the remembered sample untouched
    pub fn poll_raw(&mut self, raw: u8) -> Detents {
        match EncoderSample::try_from(raw) {
            Ok(sample) => self.poll(sample),
            Err(_) => Detents::none(),
        }
    }

    /// Add edges counted elsewhere (e.g. a hardware counter) and drain full detents
    ///
    /// The remainder is kept, never reset, so partial turns survive slow polling.
    pub fn accumulate(&mut self, edges: i32) -> Detents {
        self.accumulator = self.accumulator.saturating_add(edges);

        // truncating division drains whole detents and keeps the signed remainder
        let full = self.accumulator / EDGES_PER_DETENT;
        self.accumulator -= full * EDGES_PER_DETENT;

        match full {
            0 => Detents::none(),
            n if n > 0 => Detents::new(Direction::Up, n.unsigned_abs()),
            n => Detents::new(Direction::Down, n.unsigned_abs()),
        }
    }

    /// Partial edge progress, always strictly within (-4, 4)
    pub fn accumulator(&self) -> i32 {
        self.accumulator
    }

    pub fn previous(&self) -> EncoderSample {
        self.previous
    }
}

impl Default for QuadratureDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Gray-code samples for one detent in `direction`, starting from idle
///
/// The last sample returns to idle.
pub fn detent_sequence(direction: Direction) -> [EncoderSample; 4] {
    let cw = [0b01, 0b00, 0b10, 0b11];
    let ccw = [0b10, 0b00, 0b01, 0b11];
    let bits = match direction {
        Direction::Up => cw,
        Direction::Down => ccw,
    };
    bits.map(EncoderSample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn turn(decoder: &mut QuadratureDecoder, direction: Direction) -> Vec<Direction> {
        detent_sequence(direction)
            .into_iter()
            .flat_map(|s| decoder.poll(s))
            .collect()
    }

    #[test]
    fn test_identical_samples_have_no_delta() {
        for bits in 0..4u8 {
            assert_eq!(decode(bits, bits), 0);
        }
    }

    #[test]
    fn test_table_is_antisymmetric() {
        for prev in 0..4u8 {
            for curr in 0..4u8 {
                assert_eq!(decode(prev, curr), -decode(curr, prev));
            }
        }
    }

    #[test]
    fn test_skipped_state_is_ignored() {
        // 11 -> 00 flips both pins at once: bounce, not motion
        assert_eq!(decode(0b11, 0b00), 0);
        assert_eq!(decode(0b01, 0b10), 0);
    }

    #[test]
    fn test_out_of_range_samples_decode_to_zero() {
        assert_eq!(decode(7, 0), 0);
        assert_eq!(decode(0, 200), 0);

        let mut decoder = QuadratureDecoder::new();
        assert!(decoder.poll_raw(0xFF).is_empty());
        assert_eq!(decoder.previous(), EncoderSample::IDLE);
        assert_eq!(decoder.accumulator(), 0);
    }

    #[test]
    fn test_full_cycle_emits_one_detent() {
        let mut decoder = QuadratureDecoder::new();
        assert_eq!(turn(&mut decoder, Direction::Up), vec![Direction::Up]);
        assert_eq!(turn(&mut decoder, Direction::Down), vec![Direction::Down]);
        assert_eq!(decoder.accumulator(), 0);
    }

    #[test]
    fn test_partial_progress_is_kept() {
        let mut decoder = QuadratureDecoder::new();
        assert!(decoder.accumulate(3).is_empty());
        assert_eq!(decoder.accumulator(), 3);

        let detents = decoder.accumulate(2);
        assert_eq!(detents.len(), 1);
        assert_eq!(decoder.accumulator(), 1);
    }

    #[test]
    fn test_multiple_detents_in_one_update() {
        let mut decoder = QuadratureDecoder::new();
        let detents: Vec<_> = decoder.accumulate(-13).collect();
        assert_eq!(detents, vec![Direction::Down; 3]);
        assert_eq!(decoder.accumulator(), -1);
    }

    #[test]
    fn test_sample_pins() {
        let s = EncoderSample::new(true, false);
        assert!(s.a());
        assert!(!s.b());
        assert_eq!(s.bits(), 0b10);
        assert_eq!(EncoderSample::try_from(4), Err(4));
    }

    proptest! {
        #[test]
        fn prop_detents_track_accumulated_edges(samples in proptest::collection::vec(0u8..4, 0..400)) {
            let mut decoder = QuadratureDecoder::new();
            let mut edges = 0i32;
            let mut net_detents = 0i32;
            let mut prev = EncoderSample::IDLE.bits();

            for bits in samples {
                edges += decode(prev, bits) as i32;
                prev = bits;
                for d in decoder.poll(EncoderSample(bits)) {
                    net_detents += d.sign();
                }
                prop_assert!(decoder.accumulator() > -EDGES_PER_DETENT);
                prop_assert!(decoder.accumulator() < EDGES_PER_DETENT);
                prop_assert_eq!(net_detents * EDGES_PER_DETENT + decoder.accumulator(), edges);
            }
        }

        #[test]
        fn prop_accumulate_bounds(chunks in proptest::collection::vec(-20i32..20, 0..100)) {
            let mut decoder = QuadratureDecoder::new();
            let mut total = 0i32;
            let mut net = 0i32;
            for edges in chunks {
                total += edges;
                let detents = decoder.accumulate(edges);
                net += detents.map(|d| d.sign()).sum::<i32>();
                prop_assert!(decoder.accumulator().abs() < EDGES_PER_DETENT);
            }
            prop_assert_eq!(net * EDGES_PER_DETENT + decoder.accumulator(), total);
        }
    }
}
