//! Randomised but realistic fixture values

use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "Silent", "Crimson", "Forgotten", "Hidden", "Broken", "Golden", "Distant", "Wandering",
    "Last", "Burning", "Frozen", "Secret", "Hollow", "Restless", "Painted",
];

const NOUNS: &[&str] = &[
    "Garden", "River", "Empire", "Lighthouse", "Archive", "Orchard", "Harbor", "Mirror",
    "Kingdom", "Voyage", "Cathedral", "Compass", "Winter", "Library", "Horizon",
];

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Celia", "Dmitri", "Elena", "Farid", "Greta", "Hiro", "Ines", "Jonas",
    "Kalina", "Luca", "Maren", "Nadia", "Oskar", "Priya", "Rafael", "Sofia", "Tomasz", "Yara",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Brennan", "Castillo", "Delacroix", "Eriksen", "Fischer", "Gallagher", "Haddad",
    "Iwasaki", "Jankowski", "Kowalczyk", "Lindqvist", "Moreau", "Novak", "Okafor", "Petrov",
];

/// Inclusive page count range for random books.
pub const PAGE_COUNT_RANGE: std::ops::RangeInclusive<i32> = 30..=1200;

fn pick<R: Rng + ?Sized>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or_default()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Book-like title, e.g. "The Hidden Lighthouse"
pub fn random_title<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = pick(rng, ADJECTIVES);
    let noun = pick(rng, NOUNS);
    if rng.gen_bool(0.5) {
        format!("The {adjective} {noun}")
    } else {
        format!("{adjective} {noun}")
    }
}

/// One sentence of filler text, capitalised and terminated.
pub fn random_sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(5..=12);
    let words: Vec<&str> = (0..len).map(|_| pick(rng, WORDS)).collect();
    format!("{}.", capitalize(&words.join(" ")))
}

/// A few sentences of filler text.
pub fn random_paragraph<R: Rng + ?Sized>(rng: &mut R) -> String {
    let sentences = rng.gen_range(3..=6);
    (0..sentences)
        .map(|_| random_sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn random_page_count<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(PAGE_COUNT_RANGE)
}

pub fn random_first_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, FIRST_NAMES).to_string()
}

pub fn random_last_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, LAST_NAMES).to_string()
}
