//! Partial word reveals and candidate word draws.

use rand::Rng;
use rand::seq::SliceRandom;

/// Placeholder for a hidden character.
const HIDDEN: char = '_';

/// Renders `word` with `letters` randomly chosen characters revealed.
///
/// Every character becomes one space-separated cell, so `"clé"` with one
/// letter shown may read `"_ l _"`. Positions are a fresh random draw on
/// every call; asking for more letters than the word has reveals it all.
pub fn reveal<R: Rng + ?Sized>(word: &str, letters: usize, rng: &mut R) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut positions: Vec<usize> = (0..chars.len()).collect();
    positions.shuffle(rng);
    positions.truncate(letters);

    let mut cells = vec![HIDDEN; chars.len()];
    for i in positions {
        cells[i] = chars[i];
    }

    let mut out = String::with_capacity(cells.len() * 2);
    for (i, c) in cells.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Draws `count` words, each independently uniform from `pool`.
///
/// Duplicates are possible. An empty pool yields nothing.
pub fn candidates<R: Rng + ?Sized>(pool: &[String], count: usize, rng: &mut R) -> Vec<String> {
    if pool.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|_| pool[rng.random_range(0..pool.len())].clone())
        .collect()
}
