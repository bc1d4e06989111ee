//! Trivia deduplication.
//!
//! Most tokens in a real file carry one of a handful of trivia runs (a single
//! space, a newline plus indentation). `TriviaInterner` stores each distinct
//! run once and hands out a `TriviaHandle`, so a compacted token stream keeps
//! two small integers per token instead of two vectors of owned tokens.

use indexmap::IndexSet;
use limit_core::{InternedString, StringInterner, TextRange};
use limit_scanner::{Token, TokenKind};
use rustc_hash::FxBuildHasher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriviaPiece {
    pub kind: TokenKind,
    pub text: InternedString,
}

/// Handle to an interned trivia run. `EMPTY` is the run with no pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TriviaHandle(u32);

impl TriviaHandle {
    pub const EMPTY: TriviaHandle = TriviaHandle(0);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriviaStats {
    /// Trivia runs handed to `intern`, empty runs excluded.
    pub runs_seen: usize,
    /// Distinct runs stored.
    pub runs_stored: usize,
    /// Pieces across the stored runs.
    pub pieces_stored: usize,
    /// Text bytes across every run seen.
    pub bytes_seen: usize,
    /// Text bytes actually held by the string interner.
    pub bytes_stored: usize,
}

impl TriviaStats {
    pub fn bytes_saved(&self) -> usize {
        self.bytes_seen.saturating_sub(self.bytes_stored)
    }
}

#[derive(Default)]
pub struct TriviaInterner {
    strings: StringInterner,
    runs: IndexSet<Box<[TriviaPiece]>, FxBuildHasher>,
    runs_seen: usize,
    bytes_seen: usize,
}

impl TriviaInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share the string table with another component.
    pub fn with_strings(strings: StringInterner) -> Self {
        Self {
            strings,
            ..Self::default()
        }
    }

    pub fn intern(&mut self, trivia: &[Token]) -> TriviaHandle {
        if trivia.is_empty() {
            return TriviaHandle::EMPTY;
        }
        self.runs_seen += 1;
        let run: Box<[TriviaPiece]> = trivia
            .iter()
            .map(|t| {
                self.bytes_seen += t.text.len();
                TriviaPiece {
                    kind: t.kind,
                    text: self.strings.intern(&t.text),
                }
            })
            .collect();
        let (index, _) = self.runs.insert_full(run);
        TriviaHandle(index as u32 + 1)
    }

    pub fn resolve(&self, handle: TriviaHandle) -> &[TriviaPiece] {
        if handle.is_empty() {
            return &[];
        }
        self.runs
            .get_index(handle.0 as usize - 1)
            .map_or(&[], |run| &run[..])
    }

    pub fn piece_text(&self, piece: &TriviaPiece) -> &str {
        self.strings.resolve(piece.text)
    }

    pub fn write_text(&self, handle: TriviaHandle, out: &mut String) {
        for piece in self.resolve(handle) {
            out.push_str(self.piece_text(piece));
        }
    }

    pub fn text_of(&self, handle: TriviaHandle) -> String {
        let mut out = String::new();
        self.write_text(handle, &mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn stats(&self) -> TriviaStats {
        TriviaStats {
            runs_seen: self.runs_seen,
            runs_stored: self.runs.len(),
            pieces_stored: self.runs.iter().map(|r| r.len()).sum(),
            bytes_seen: self.bytes_seen,
            bytes_stored: self.strings.stored_bytes(),
        }
    }

    pub fn compact(&mut self, tokens: &[Token]) -> Vec<CompactToken> {
        tokens
            .iter()
            .map(|token| CompactToken {
                kind: token.kind,
                text: token.text.clone(),
                line: token.line,
                range: token.range(),
                leading: self.intern(&token.leading_trivia),
                trailing: self.intern(&token.trailing_trivia),
            })
            .collect()
    }
}

/// A token whose trivia lives in a `TriviaInterner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactToken {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub range: TextRange,
    pub leading: TriviaHandle,
    pub trailing: TriviaHandle,
}

impl CompactToken {
    pub fn write_full_text(&self, interner: &TriviaInterner, out: &mut String) {
        interner.write_text(self.leading, out);
        out.push_str(&self.text);
        interner.write_text(self.trailing, out);
    }

    /// Rebuild the exact source of a compacted stream.
    pub fn reconstruct(tokens: &[CompactToken], interner: &TriviaInterner) -> String {
        let mut out = String::new();
        for token in tokens {
            token.write_full_text(interner, &mut out);
        }
        out
    }
}
