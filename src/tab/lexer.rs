use crate::error::RollError;

/// Token types of the tab notation
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Note letter `A`-`G`
    Letter(char),
    /// Scale degree `1`-`7`
    Degree(u8),
    Sharp,      // #
    Flat,       // b
    OctaveUp,   // ° ' *
    LeftParen,  // (
    RightParen, // )
    Newline,
}

/// A token with its position in the source
#[derive(Debug, Clone)]
pub struct LocatedToken {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

/// Lexer for tab text
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn tokenize(&mut self) -> Result<Vec<LocatedToken>, RollError> {
        let mut tokens = Vec::new();

        while let Some(&c) = self.chars.peek() {
            let line = self.line;
            let column = self.column;
            self.advance();

            let token = match c {
                'A'..='G' => Token::Letter(c),
                '1'..='7' => Token::Degree(c as u8 - b'0'),
                '#' => Token::Sharp,
                'b' => Token::Flat,
                '°' | '\'' | '*' => Token::OctaveUp,
                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                '\n' => Token::Newline,
                // Bar lines only structure the text visually
                '|' => continue,
                c if c.is_whitespace() => continue,
                _ => {
                    return Err(RollError::TabParse {
                        line,
                        column,
                        message: format!("Unexpected character '{}'", c),
                    })
                }
            };
            tokens.push(LocatedToken {
                token,
                line,
                column,
            });
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_symbols_and_modifiers() {
        assert_eq!(
            kinds("C#° Eb 5'"),
            vec![
                Token::Letter('C'),
                Token::Sharp,
                Token::OctaveUp,
                Token::Letter('E'),
                Token::Flat,
                Token::Degree(5),
                Token::OctaveUp,
            ]
        );
    }

    #[test]
    fn test_bars_and_spaces_skipped() {
        assert_eq!(
            kinds("| (C E) |\nG"),
            vec![
                Token::LeftParen,
                Token::Letter('C'),
                Token::Letter('E'),
                Token::RightParen,
                Token::Newline,
                Token::Letter('G'),
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("C D\n  E°").tokenize().unwrap();
        let e = &tokens[3];
        assert_eq!(e.token, Token::Letter('E'));
        assert_eq!((e.line, e.column), (2, 3));
        assert_eq!((tokens[4].line, tokens[4].column), (2, 4));
    }

    #[test]
    fn test_unknown_character() {
        let err = Lexer::new("C D\nE X").tokenize().unwrap_err();
        match err {
            RollError::TabParse { line, column, .. } => assert_eq!((line, column), (2, 3)),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(Lexer::new("8").tokenize().is_err());
    }
}
