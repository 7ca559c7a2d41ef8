//! Health word-guess mini-game.
//!
//! The player has [`MAX_GUESSES`] attempts to find a five-letter health term.
//! Each submitted guess is scored tile by tile and folded into a keyboard
//! status map; the term's definition is revealed once the game ends.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{MAX_GUESSES, WORD_LENGTH};

/// A guessable term and the definition shown after the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthTerm {
    pub word: &'static str,
    pub definition: &'static str,
}

const fn term(word: &'static str, definition: &'static str) -> HealthTerm {
    HealthTerm { word, definition }
}

pub static HEALTH_TERMS: [HealthTerm; 20] = [
    term(
        "PULSE",
        "The rhythmic expansion of an artery that can be felt as blood is pumped through it.",
    ),
    term(
        "BLOOD",
        "The red fluid that circulates through the heart, arteries, and veins, carrying oxygen and nutrients.",
    ),
    term(
        "HEART",
        "The muscular organ that pumps blood through the circulatory system.",
    ),
    term(
        "LUNGS",
        "The pair of breathing organs located in the chest that remove carbon dioxide and provide oxygen.",
    ),
    term(
        "BRACE",
        "A device that supports or aligns a body part to help proper healing or correct alignment.",
    ),
    term(
        "VIRUS",
        "A microscopic infectious agent that can only replicate inside living cells of an organism.",
    ),
    term(
        "FEVER",
        "An abnormally high body temperature, usually a sign that the body is fighting an infection.",
    ),
    term(
        "BRAIN",
        "The organ inside the skull that controls thought, memory, feelings, and activity.",
    ),
    term(
        "ANKLE",
        "The joint connecting the foot to the leg, allowing movement in multiple directions.",
    ),
    term(
        "CHEST",
        "The front part of the body between the neck and abdomen, containing the heart and lungs.",
    ),
    term(
        "SPINE",
        "The series of vertebrae extending from the base of the skull to the tailbone.",
    ),
    term(
        "JOINT",
        "A connection between two bones that allows for movement and flexibility.",
    ),
    term(
        "WOUND",
        "An injury to living tissue, typically involving a cut or break in the skin.",
    ),
    term(
        "ECZEMA",
        "A skin condition causing areas of skin to become itchy, red, cracked, and rough.",
    ),
    term(
        "NASAL",
        "Relating to the nose, its cavities, or the airway passages connecting to it.",
    ),
    term(
        "LIVER",
        "A large organ that processes nutrients, filters toxins from blood, and produces proteins.",
    ),
    term(
        "GLAND",
        "An organ that produces and releases substances for use elsewhere in the body.",
    ),
    term(
        "VENOM",
        "A toxic substance produced by animals like snakes that is injected into prey or predators.",
    ),
    term(
        "TOXIN",
        "A poisonous substance produced by living cells or organisms.",
    ),
    term(
        "SPASM",
        "A sudden, involuntary contraction of a muscle or group of muscles.",
    ),
];

/// Terms that fit the board; longer entries stay in the glossary only.
pub fn playable_terms() -> impl Iterator<Item = &'static HealthTerm> {
    HEALTH_TERMS.iter().filter(|t| t.word.len() == WORD_LENGTH)
}

#[must_use]
pub fn definition(word: &str) -> Option<&'static str> {
    HEALTH_TERMS
        .iter()
        .find(|t| t.word.eq_ignore_ascii_case(word))
        .map(|t| t.definition)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileStatus {
    /// Right letter, right position.
    Correct,
    /// Letter appears elsewhere in the word.
    Present,
    Absent,
}

impl TileStatus {
    const fn rank(self) -> u8 {
        match self {
            Self::Absent => 0,
            Self::Present => 1,
            Self::Correct => 2,
        }
    }

    /// Keep the stronger of two statuses for the same key.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordleStatus {
    InProgress,
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRow {
    pub word: String,
    pub tiles: [TileStatus; WORD_LENGTH],
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum GuessError {
    #[error("guess needs {WORD_LENGTH} letters (got {0})")]
    TooShort(usize),
    #[error("guess already has {WORD_LENGTH} letters")]
    RowFull,
    #[error("{0:?} is not a letter")]
    NotALetter(char),
    #[error("the game is over")]
    GameOver,
}

/// Score `guess` against `target`. Both must be uppercase ASCII of board width.
#[must_use]
pub fn evaluate_guess(guess: &str, target: &str) -> [TileStatus; WORD_LENGTH] {
    let target = target.as_bytes();
    let mut tiles = [TileStatus::Absent; WORD_LENGTH];
    for (idx, (tile, letter)) in tiles.iter_mut().zip(guess.bytes()).enumerate() {
        *tile = if target.get(idx) == Some(&letter) {
            TileStatus::Correct
        } else if target.contains(&letter) {
            TileStatus::Present
        } else {
            TileStatus::Absent
        };
    }
    tiles
}

/// One round of the word game.
#[derive(Debug, Clone)]
pub struct WordleGame {
    target: &'static HealthTerm,
    guesses: Vec<GuessRow>,
    current: String,
    keyboard: BTreeMap<char, TileStatus>,
    status: WordleStatus,
}

impl WordleGame {
    /// Start a game with a uniformly drawn playable term.
    pub fn new<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::start(draw_term(rng))
    }

    /// Start a game on a known word; `None` if it is not a playable term.
    #[must_use]
    pub fn with_target(word: &str) -> Option<Self> {
        playable_terms()
            .find(|t| t.word.eq_ignore_ascii_case(word))
            .map(Self::start)
    }

    fn start(target: &'static HealthTerm) -> Self {
        Self {
            target,
            guesses: Vec::with_capacity(MAX_GUESSES),
            current: String::with_capacity(WORD_LENGTH),
            keyboard: BTreeMap::new(),
            status: WordleStatus::InProgress,
        }
    }

    /// Throw away the board and draw a fresh word.
    pub fn restart<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        *self = Self::new(rng);
    }

    /// Append a letter to the pending guess.
    ///
    /// # Errors
    ///
    /// Rejects non-letters, a full row, or input after the game ended.
    pub fn push_letter(&mut self, letter: char) -> Result<(), GuessError> {
        self.ensure_in_progress()?;
        if !letter.is_ascii_alphabetic() {
            return Err(GuessError::NotALetter(letter));
        }
        if self.current.len() >= WORD_LENGTH {
            return Err(GuessError::RowFull);
        }
        self.current.push(letter.to_ascii_uppercase());
        Ok(())
    }

    /// Remove the last pending letter.
    pub fn pop_letter(&mut self) -> Option<char> {
        if self.status != WordleStatus::InProgress {
            return None;
        }
        self.current.pop()
    }

    /// Score the pending guess and advance the board.
    ///
    /// # Errors
    ///
    /// Rejects a partial row or any submit after the game ended; the pending
    /// guess is kept so the player can finish it.
    pub fn submit(&mut self) -> Result<&GuessRow, GuessError> {
        self.ensure_in_progress()?;
        if self.current.len() != WORD_LENGTH {
            return Err(GuessError::TooShort(self.current.len()));
        }
        let word = std::mem::take(&mut self.current);
        let tiles = evaluate_guess(&word, self.target.word);
        for (letter, tile) in word.chars().zip(tiles) {
            self.keyboard
                .entry(letter)
                .and_modify(|status| *status = status.merge(tile))
                .or_insert(tile);
        }
        self.status = if word == self.target.word {
            WordleStatus::Won
        } else if self.guesses.len() + 1 >= MAX_GUESSES {
            WordleStatus::Lost
        } else {
            WordleStatus::InProgress
        };
        self.guesses.push(GuessRow { word, tiles });
        Ok(&self.guesses[self.guesses.len() - 1])
    }

    const fn ensure_in_progress(&self) -> Result<(), GuessError> {
        match self.status {
            WordleStatus::InProgress => Ok(()),
            WordleStatus::Won | WordleStatus::Lost => Err(GuessError::GameOver),
        }
    }

    #[must_use]
    pub const fn status(&self) -> WordleStatus {
        self.status
    }

    #[must_use]
    pub fn guesses(&self) -> &[GuessRow] {
        &self.guesses
    }

    #[must_use]
    pub fn current_guess(&self) -> &str {
        &self.current
    }

    #[must_use]
    pub fn remaining_guesses(&self) -> usize {
        MAX_GUESSES.saturating_sub(self.guesses.len())
    }

    /// Best status seen so far for a keyboard key.
    #[must_use]
    pub fn key_status(&self, letter: char) -> Option<TileStatus> {
        self.keyboard.get(&letter.to_ascii_uppercase()).copied()
    }

    #[must_use]
    pub const fn keyboard(&self) -> &BTreeMap<char, TileStatus> {
        &self.keyboard
    }

    /// The answer and its definition, available once the game has ended.
    #[must_use]
    pub fn revealed(&self) -> Option<&'static HealthTerm> {
        match self.status {
            WordleStatus::InProgress => None,
            WordleStatus::Won | WordleStatus::Lost => Some(self.target),
        }
    }
}

fn draw_term<R>(rng: &mut R) -> &'static HealthTerm
where
    R: Rng + ?Sized,
{
    let count = playable_terms().count();
    let index = rng.gen_range(0..count.max(1));
    playable_terms().nth(index).unwrap_or(&HEALTH_TERMS[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn type_word(game: &mut WordleGame, word: &str) {
        for c in word.chars() {
            game.push_letter(c).unwrap();
        }
    }

    #[test]
    fn six_letter_terms_are_not_playable() {
        assert!(playable_terms().all(|t| t.word.len() == WORD_LENGTH));
        assert_eq!(playable_terms().count(), HEALTH_TERMS.len() - 1);
        assert!(WordleGame::with_target("ECZEMA").is_none());
        assert!(definition("eczema").is_some());
    }

    #[test]
    fn tiles_mark_position_and_presence() {
        use TileStatus::{Absent, Correct, Present};
        assert_eq!(
            evaluate_guess("HEART", "HEART"),
            [Correct, Correct, Correct, Correct, Correct]
        );
        assert_eq!(
            evaluate_guess("EARTH", "HEART"),
            [Present, Present, Present, Present, Present]
        );
        assert_eq!(
            evaluate_guess("PULSE", "LUNGS"),
            [Absent, Correct, Present, Present, Absent]
        );
    }

    #[test]
    fn keyboard_keeps_the_strongest_status() {
        let mut game = WordleGame::with_target("HEART").unwrap();
        type_word(&mut game, "HATER");
        game.submit().unwrap();
        assert_eq!(game.key_status('h'), Some(TileStatus::Correct));
        assert_eq!(game.key_status('A'), Some(TileStatus::Present));

        type_word(&mut game, "BEAST");
        game.submit().unwrap();
        assert_eq!(game.key_status('A'), Some(TileStatus::Correct));
        assert_eq!(game.key_status('H'), Some(TileStatus::Correct));
        assert_eq!(game.key_status('B'), Some(TileStatus::Absent));
        assert_eq!(game.key_status('Z'), None);
    }

    #[test]
    fn winning_reveals_definition_and_locks_input() {
        let mut game = WordleGame::with_target("fever").unwrap();
        type_word(&mut game, "fever");
        let row = game.submit().unwrap();
        assert_eq!(row.word, "FEVER");
        assert_eq!(game.status(), WordleStatus::Won);
        assert_eq!(game.revealed().map(|t| t.word), Some("FEVER"));
        assert_eq!(game.push_letter('A'), Err(GuessError::GameOver));
        assert_eq!(game.pop_letter(), None);
    }

    #[test]
    fn six_misses_lose_the_game() {
        let mut game = WordleGame::with_target("SPINE").unwrap();
        for _ in 0..MAX_GUESSES {
            assert!(game.revealed().is_none());
            type_word(&mut game, "BLOOD");
            game.submit().unwrap();
        }
        assert_eq!(game.status(), WordleStatus::Lost);
        assert_eq!(game.remaining_guesses(), 0);
        assert_eq!(game.revealed().map(|t| t.word), Some("SPINE"));
        assert_eq!(game.submit().unwrap_err(), GuessError::GameOver);
    }

    #[test]
    fn input_validation() {
        let mut game = WordleGame::with_target("GLAND").unwrap();
        assert_eq!(game.push_letter('1'), Err(GuessError::NotALetter('1')));
        type_word(&mut game, "GLA");
        assert_eq!(game.submit().unwrap_err(), GuessError::TooShort(3));
        assert_eq!(game.current_guess(), "GLA");
        type_word(&mut game, "ND");
        assert_eq!(game.push_letter('X'), Err(GuessError::RowFull));
        assert_eq!(game.pop_letter(), Some('D'));
        assert_eq!(game.current_guess(), "GLAN");
        assert!(game.guesses().is_empty());
    }

    #[test]
    fn seeded_draws_pick_playable_words() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        for _ in 0..40 {
            let mut game = WordleGame::new(&mut rng);
            game.restart(&mut rng);
            assert_eq!(game.status(), WordleStatus::InProgress);
            assert_eq!(game.remaining_guesses(), MAX_GUESSES);
        }
    }
}
