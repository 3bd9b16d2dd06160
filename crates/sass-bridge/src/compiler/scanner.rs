/*
 * scanner.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Character scanner with line/column tracking and backtracking marks.

use super::ast::Span;

#[derive(Debug, Clone, Copy)]
pub struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

pub fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

pub fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
    }

    pub fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
        }
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn looking_at(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    /// Case-insensitive variant of [`Scanner::looking_at`] for ASCII text.
    pub fn looking_at_ignore_case(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i).is_some_and(|p| p.eq_ignore_ascii_case(&c)))
    }

    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.looking_at(s) {
            for _ in s.chars() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    /// Consume `word` when it is not followed by another name character.
    pub fn eat_keyword(&mut self, word: &str) -> bool {
        let len = word.chars().count();
        if self.looking_at(word) && !self.peek_at(len).is_some_and(is_name_char) {
            self.eat_str(word)
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    /// Skip a `//` comment up to (not including) the end of the line.
    pub fn skip_silent_comment(&mut self) -> bool {
        if !self.looking_at("//") {
            return false;
        }
        while self.peek().is_some_and(|c| c != '\n') {
            self.bump();
        }
        true
    }

    /// Consume a `/* ... */` comment and return its full text.
    pub fn loud_comment(&mut self) -> Option<String> {
        if !self.looking_at("/*") {
            return None;
        }
        let start = self.pos;
        self.bump();
        self.bump();
        while !self.is_done() && !self.looking_at("*/") {
            self.bump();
        }
        self.eat_str("*/");
        Some(self.chars[start..self.pos].iter().collect())
    }

    /// Skip whitespace and both comment styles. Returns true when anything
    /// was skipped.
    pub fn skip_trivia(&mut self) -> bool {
        let start = self.pos;
        loop {
            let before = self.pos;
            self.skip_whitespace();
            self.skip_silent_comment();
            self.loud_comment();
            if self.pos == before {
                break;
            }
        }
        self.pos > start
    }

    /// Text since `mark`.
    pub fn slice_from(&self, mark: Mark) -> String {
        self.chars[mark.pos..self.pos].iter().collect()
    }

    /// The current line up to the scanner position, left-trimmed.
    pub fn line_before(&self) -> String {
        let mut start = self.pos;
        while start > 0 && self.chars[start - 1] != '\n' {
            start -= 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.trim().to_string()
    }

    /// The rest of the current line from the scanner position, trimmed.
    pub fn line_after(&self) -> String {
        let mut end = self.pos;
        while end < self.chars.len() && self.chars[end] != '\n' {
            end += 1;
        }
        let text: String = self.chars[self.pos..end].iter().collect();
        text.trim().chars().take(20).collect()
    }
}
