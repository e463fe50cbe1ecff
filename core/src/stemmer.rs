//! Light affix-stripping stemmer for Bahasa Indonesia.
//!
//! Dictionary-free: particles, possessive pronouns, derivational prefixes and suffixes are
//! stripped by rule while the word keeps more than two syllables (vowel count). Output is a
//! root form, not necessarily a dictionary word.

const REMOVED_KE: u8 = 1;
const REMOVED_PENG: u8 = 1 << 1;
const REMOVED_DI: u8 = 1 << 2;
const REMOVED_MENG: u8 = 1 << 3;
const REMOVED_TER: u8 = 1 << 4;
const REMOVED_BER: u8 = 1 << 5;
const REMOVED_PE: u8 = 1 << 6;

#[derive(Debug, Default, Clone, Copy)]
pub struct IndonesianStemmer;

impl IndonesianStemmer {
    pub fn new() -> Self {
        Self
    }

    pub fn stem(&self, word: &str) -> String {
        let mut w = Word::new(word);
        if w.syllables > 2 {
            w.remove_particle();
        }
        if w.syllables > 2 {
            w.remove_possessive_pronoun();
        }
        w.stem_derivational();
        w.chars.into_iter().collect()
    }
}

struct Word {
    chars: Vec<char>,
    syllables: usize,
    flags: u8,
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

impl Word {
    fn new(word: &str) -> Self {
        let chars: Vec<char> = word.chars().collect();
        let syllables = chars.iter().filter(|c| is_vowel(**c)).count();
        Self { chars, syllables, flags: 0 }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        let n = prefix.chars().count();
        self.chars.len() >= n && self.chars.iter().zip(prefix.chars()).all(|(a, b)| *a == b)
    }

    fn ends_with(&self, suffix: &str) -> bool {
        let n = suffix.chars().count();
        self.chars.len() >= n && self.chars[self.chars.len() - n..].iter().copied().eq(suffix.chars())
    }

    fn is(&self, whole: &str) -> bool {
        self.chars.iter().copied().eq(whole.chars())
    }

    fn vowel_at(&self, i: usize) -> bool {
        self.chars.get(i).copied().map_or(false, is_vowel)
    }

    fn drop_front(&mut self, n: usize) {
        self.chars.drain(..n);
        self.syllables = self.syllables.saturating_sub(1);
    }

    fn drop_back(&mut self, n: usize) {
        let len = self.chars.len();
        self.chars.truncate(len - n);
        self.syllables = self.syllables.saturating_sub(1);
    }

    fn remove_particle(&mut self) {
        if ["kah", "lah", "tah", "pun"].iter().any(|p| self.ends_with(p)) {
            self.drop_back(3);
        }
    }

    fn remove_possessive_pronoun(&mut self) {
        if self.ends_with("ku") || self.ends_with("mu") {
            self.drop_back(2);
        } else if self.ends_with("nya") {
            self.drop_back(3);
        }
    }

    /// First-order prefixes: me-, pe- (nasal variants), di-, ter-, ke-.
    fn remove_first_order_prefix(&mut self) {
        if self.starts_with("meng") {
            self.flags |= REMOVED_MENG;
            self.drop_front(4);
        } else if self.starts_with("meny") && self.vowel_at(4) {
            self.flags |= REMOVED_MENG;
            self.chars[3] = 's';
            self.drop_front(3);
        } else if self.starts_with("men") && self.vowel_at(3) {
            self.flags |= REMOVED_MENG;
            self.chars[2] = 't';
            self.drop_front(2);
        } else if self.starts_with("mem") && self.vowel_at(3) {
            self.flags |= REMOVED_MENG;
            self.chars[2] = 'p';
            self.drop_front(2);
        } else if self.starts_with("men") || self.starts_with("mem") {
            self.flags |= REMOVED_MENG;
            self.drop_front(3);
        } else if self.starts_with("me") {
            self.flags |= REMOVED_MENG;
            self.drop_front(2);
        } else if self.starts_with("peng") {
            self.flags |= REMOVED_PENG;
            self.drop_front(4);
        } else if self.starts_with("peny") && self.vowel_at(4) {
            self.flags |= REMOVED_PENG;
            self.chars[3] = 's';
            self.drop_front(3);
        } else if self.starts_with("peny") {
            self.flags |= REMOVED_PENG;
            self.drop_front(4);
        } else if self.starts_with("pen") && self.vowel_at(3) {
            self.flags |= REMOVED_PENG;
            self.chars[2] = 't';
            self.drop_front(2);
        } else if self.starts_with("pem") && self.vowel_at(3) {
            self.flags |= REMOVED_PENG;
            self.chars[2] = 'p';
            self.drop_front(2);
        } else if self.starts_with("pen") || self.starts_with("pem") {
            self.flags |= REMOVED_PENG;
            self.drop_front(3);
        } else if self.starts_with("di") {
            self.flags |= REMOVED_DI;
            self.drop_front(2);
        } else if self.starts_with("ter") {
            self.flags |= REMOVED_TER;
            self.drop_front(3);
        } else if self.starts_with("ke") {
            self.flags |= REMOVED_KE;
            self.drop_front(2);
        }
    }

    /// Second-order prefixes: ber-, per-, pe-.
    fn remove_second_order_prefix(&mut self) {
        if self.starts_with("ber") {
            self.flags |= REMOVED_BER;
            self.drop_front(3);
        } else if self.is("belajar") {
            self.flags |= REMOVED_BER;
            self.drop_front(3);
        } else if self.starts_with("be")
            && self.chars.len() > 4
            && !self.vowel_at(2)
            && self.chars[3] == 'e'
            && self.chars[4] == 'r'
        {
            self.flags |= REMOVED_BER;
            self.drop_front(2);
        } else if self.starts_with("per") || self.is("pelajar") {
            self.drop_front(3);
        } else if self.starts_with("pe") {
            self.flags |= REMOVED_PE;
            self.drop_front(2);
        }
    }

    fn remove_suffix(&mut self) {
        if self.ends_with("kan") && self.flags & (REMOVED_KE | REMOVED_PENG | REMOVED_PE) == 0 {
            self.drop_back(3);
        } else if self.ends_with("an") && self.flags & (REMOVED_DI | REMOVED_MENG | REMOVED_TER) == 0 {
            self.drop_back(2);
        } else if self.ends_with("i")
            && !self.ends_with("si")
            && self.flags & (REMOVED_BER | REMOVED_KE | REMOVED_PENG) == 0
        {
            self.drop_back(1);
        }
    }

    fn stem_derivational(&mut self) {
        let before = self.chars.len();
        if self.syllables > 2 {
            self.remove_first_order_prefix();
        }
        if before != self.chars.len() {
            let before = self.chars.len();
            if self.syllables > 2 {
                self.remove_suffix();
            }
            if before != self.chars.len() && self.syllables > 2 {
                self.remove_second_order_prefix();
            }
        } else {
            if self.syllables > 2 {
                self.remove_second_order_prefix();
            }
            if self.syllables > 2 {
                self.remove_suffix();
            }
        }
    }
}
