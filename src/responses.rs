//! The classic twenty answers and a time-seeded picker.
//!
//! Not cryptographic: every pick reseeds from the millisecond clock, which is
//! plenty for a toy and keeps the picker stateless.

pub const RESPONSES: [&str; 20] = [
    "It is certain",
    "Reply hazy, try again",
    "Don't count on it",
    "It is decidedly so",
    "Ask again later",
    "My reply is no",
    "Without a doubt",
    "Better not tell you now",
    "My sources say no",
    "Yes definitely",
    "Cannot predict now",
    "Outlook not so good",
    "You may rely on it",
    "Concentrate and ask again",
    "Very doubtful",
    "As I see it, yes",
    "Most likely",
    "Outlook good",
    "Yes",
    "Signs point to yes",
];

const GOLDEN: u32 = 0x9E37_79B9;

// One xorshift32 round over the folded seed.
fn scramble(seed: u64) -> u32 {
    let mut x = ((seed ^ (seed >> 32)) as u32) ^ GOLDEN;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x
}

/// Index in `0..len`; `len` must be non-zero.
pub fn seeded_index(seed: u64, len: usize) -> usize {
    scramble(seed) as usize % len
}

/// Answer for an event accepted at `now_ms`.
pub fn pick(now_ms: u64) -> &'static str {
    RESPONSES[seeded_index(now_ms, RESPONSES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_always_in_range() {
        for seed in (0..10_000u64).chain([u64::MAX, u64::MAX - 1, 1 << 40]) {
            assert!(seeded_index(seed, RESPONSES.len()) < RESPONSES.len());
            assert!(seeded_index(seed, 3) < 3);
        }
    }

    #[test]
    fn same_time_same_answer() {
        assert_eq!(pick(123_456), pick(123_456));
    }

    #[test]
    fn every_answer_is_reachable() {
        let mut seen = [false; RESPONSES.len()];
        for t in (0..200_000u64).step_by(100) {
            seen[seeded_index(t, RESPONSES.len())] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
