//! Table alias generation (spec §4.3, §9).
//!
//! The source picks a random 3-character uppercase/digit token per alias.
//! Alias generation is the compiler's only source of nondeterminism, so it
//! is injected through the [`AliasSource`] trait rather than called
//! directly, letting tests supply a deterministic sequence (spec §5, §9:
//! "expose the random source as a compiler option").

use rand::Rng;

/// Produces the next alias for a cube, given the cube's (possibly
/// dot-qualified) name. Implementations need not check for collisions
/// themselves -- callers regenerate on collision (spec §4.3).
pub trait AliasSource {
    fn next_alias(&mut self, cube_name: &str) -> String;
}

fn last_segment(cube_name: &str) -> &str {
    cube_name.rsplit('.').next().unwrap_or(cube_name)
}

const ALIAS_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default alias source: last dot-segment of the cube name, an underscore,
/// and a random uppercase/digit token 3-6 characters long (spec §4.3).
#[derive(Debug, Default)]
pub struct RandomAliasSource;

impl AliasSource for RandomAliasSource {
    fn next_alias(&mut self, cube_name: &str) -> String {
        let mut rng = rand::rng();
        let len = rng.random_range(3..=6);
        let token: String = (0..len)
            .map(|_| ALIAS_CHARS[rng.random_range(0..ALIAS_CHARS.len())] as char)
            .collect();
        format!("{}_{}", last_segment(cube_name), token)
    }
}

/// A deterministic alias source for tests and reproducible output: a
/// monotonically increasing counter rendered as a 3-digit, zero-padded
/// token (spec §5, §9).
#[derive(Debug, Default)]
pub struct SequentialAliasSource {
    next: u32,
}

impl SequentialAliasSource {
    pub fn new() -> Self {
        Self { next: 0 }
    }
}

impl AliasSource for SequentialAliasSource {
    fn next_alias(&mut self, cube_name: &str) -> String {
        let token = format!("{:03}", self.next);
        self.next += 1;
        format!("{}_{}", last_segment(cube_name), token)
    }
}
