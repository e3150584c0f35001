//! Parser of propositional formulas written in infix notation.
//!
//! ```text
//! formula := imp ("<=>" imp)*
//! imp     := or ("=>" imp)?
//! or      := and ("|" and)*
//! and     := unary ("&" unary)*
//! unary   := "!" unary | "(" formula ")" | IDENT
//! ```
//!
//! `~`, `->`, and `<->` are accepted as aliases of `!`, `=>`, and `<=>`.
//! Everything from `%` to the end of the line is a comment. Chains of the same
//! operator are built as nested binary nodes, left-associated except for `=>`.
use logos::Logos;

use crate::{error::ParseError, formula::FormulaId, manager::FormulaManager};

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"%[^\n]*")]
enum Token<'a> {
    #[regex(r"[A-Za-z_][A-Za-z0-9_']*", |lex| lex.slice())]
    Ident(&'a str),

    #[token("!")]
    #[token("~")]
    Not,

    #[token("&")]
    And,

    #[token("|")]
    Or,

    #[token("=>")]
    #[token("->")]
    Imp,

    #[token("<=>")]
    #[token("<->")]
    Iff,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

fn describe(token: Option<&Token>) -> String {
    match token {
        Some(Token::Ident(ident)) => format!("identifier '{ident}'"),
        Some(Token::Not) => "'!'".to_owned(),
        Some(Token::And) => "'&'".to_owned(),
        Some(Token::Or) => "'|'".to_owned(),
        Some(Token::Imp) => "'=>'".to_owned(),
        Some(Token::Iff) => "'<=>'".to_owned(),
        Some(Token::LParen) => "'('".to_owned(),
        Some(Token::RParen) => "')'".to_owned(),
        None => "end of input".to_owned(),
    }
}

/// Error at byte `offset` of `source`, with 1-based line and column.
fn error_at(source: &str, offset: usize, message: String) -> ParseError {
    let before = &source[..offset];
    let line_start = before.rfind('\n').map_or(0, |newline| newline + 1);

    ParseError {
        line: before.matches('\n').count() + 1,
        column: before[line_start..].chars().count() + 1,
        message,
    }
}

struct Parser<'a> {
    manager: &'a FormulaManager,
    source: &'a str,
    lexer: logos::Lexer<'a, Token<'a>>,
    // Current token, `None` at the end of input.
    current: Option<Token<'a>>,
    // Byte offset of the current token.
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(manager: &'a FormulaManager, source: &'a str) -> Result<Self, ParseError> {
        let mut parser = Parser {
            manager,
            source,
            lexer: Token::lexer(source),
            current: None,
            offset: 0,
        };

        parser.advance()?;
        Ok(parser)
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        match self.lexer.next() {
            Some(Ok(token)) => {
                self.current = Some(token);
                self.offset = self.lexer.span().start;
            }
            Some(Err(())) => {
                let offset = self.lexer.span().start;
                let c = self.source[offset..].chars().next().unwrap_or_default();
                return Err(error_at(
                    self.source,
                    offset,
                    format!("unexpected character '{c}'"),
                ));
            }
            None => {
                self.current = None;
                self.offset = self.source.len();
            }
        }

        Ok(())
    }

    fn at(&self, token: &Token) -> bool {
        self.current.as_ref() == Some(token)
    }

    fn error(&self, message: String) -> ParseError {
        error_at(self.source, self.offset, message)
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ParseError> {
        if self.at(expected) {
            self.advance()
        } else {
            Err(self.error(format!(
                "expected {} but found {}",
                describe(Some(expected)),
                describe(self.current.as_ref())
            )))
        }
    }

    fn formula(&mut self) -> Result<FormulaId, ParseError> {
        let mut formula = self.implication()?;
        while self.at(&Token::Iff) {
            self.advance()?;
            let snd = self.implication()?;
            formula = self.manager.iff(formula, snd);
        }

        Ok(formula)
    }

    fn implication(&mut self) -> Result<FormulaId, ParseError> {
        let mut formula = self.disjunction()?;
        let mut antecedents = Vec::new();
        while self.at(&Token::Imp) {
            self.advance()?;
            antecedents.push(formula);
            formula = self.disjunction()?;
        }

        // `a => b => c` is `a => (b => c)`.
        while let Some(fst) = antecedents.pop() {
            formula = self.manager.imp(fst, formula);
        }

        Ok(formula)
    }

    fn disjunction(&mut self) -> Result<FormulaId, ParseError> {
        let mut formula = self.conjunction()?;
        while self.at(&Token::Or) {
            self.advance()?;
            let snd = self.conjunction()?;
            formula = self.manager.or(formula, snd);
        }

        Ok(formula)
    }

    fn conjunction(&mut self) -> Result<FormulaId, ParseError> {
        let mut formula = self.unary()?;
        while self.at(&Token::And) {
            self.advance()?;
            let snd = self.unary()?;
            formula = self.manager.and(formula, snd);
        }

        Ok(formula)
    }

    fn unary(&mut self) -> Result<FormulaId, ParseError> {
        let mut negations = 0;
        while self.at(&Token::Not) {
            self.advance()?;
            negations += 1;
        }

        let mut formula = match self.current {
            Some(Token::Ident(label)) => {
                self.advance()?;
                self.manager.atom(label)
            }
            Some(Token::LParen) => {
                self.advance()?;
                let formula = self.formula()?;
                self.expect(&Token::RParen)?;
                formula
            }
            _ => {
                return Err(self.error(format!(
                    "expected a formula but found {}",
                    describe(self.current.as_ref())
                )))
            }
        };

        for _ in 0..negations {
            formula = self.manager.not(formula);
        }

        Ok(formula)
    }
}

/// Parse `source` and build the formula through `manager`.
///
/// # Errors
///
/// Returns an error with the position of the first offending token.
pub fn parse(manager: &FormulaManager, source: &str) -> Result<FormulaId, ParseError> {
    let mut parser = Parser::new(manager, source)?;

    let formula = parser.formula()?;
    if parser.current.is_some() {
        return Err(parser.error(format!(
            "unexpected {} after the formula",
            describe(parser.current.as_ref())
        )));
    }

    Ok(formula)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use logos::Logos;

    use super::{parse, Token};
    use crate::error::ParseError;
    use crate::manager::FormulaManager;

    fn roundtrip(source: &str) -> String {
        let manager = FormulaManager::default();
        let formula = parse(&manager, source).unwrap();
        manager.display(formula).to_string()
    }

    #[test]
    fn tokens() {
        let tokens: Vec<_> = Token::lexer("~a' -> (b <-> c) % done\n&").collect();
        assert_eq!(
            tokens,
            vec![
                Ok(Token::Not),
                Ok(Token::Ident("a'")),
                Ok(Token::Imp),
                Ok(Token::LParen),
                Ok(Token::Ident("b")),
                Ok(Token::Iff),
                Ok(Token::Ident("c")),
                Ok(Token::RParen),
                Ok(Token::And),
            ]
        );
    }

    #[test]
    fn precedence() {
        assert_eq!(roundtrip("a"), "a");
        assert_eq!(roundtrip("!a & b | c"), "(((! a) & b) | c)");
        assert_eq!(roundtrip("a | b & c"), "(a | (b & c))");
        assert_eq!(roundtrip("a => b | c <=> d"), "((a => (b | c)) <=> d)");
        assert_eq!(roundtrip("!(a & b)"), "(! (a & b))");
    }

    #[test]
    fn associativity() {
        assert_eq!(roundtrip("a & b & c"), "((a & b) & c)");
        assert_eq!(roundtrip("a => b => c"), "(a => (b => c))");
        assert_eq!(roundtrip("a <=> b <=> c"), "((a <=> b) <=> c)");
    }

    #[test]
    fn aliases_and_comments() {
        assert_eq!(
            roundtrip("% implication\n~x_1 -> (y' <-> z) % trailing\n"),
            "((! x_1) => (y' <=> z))"
        );
    }

    #[test]
    fn shared_subformulas_are_interned() {
        let manager = FormulaManager::default();
        let formula = parse(&manager, "(a & b) | (a & b)").unwrap();

        let operands = manager.operands(formula);
        assert_eq!(operands[0], operands[1]);
        assert_eq!(manager.len(), 4);
    }

    #[test]
    fn errors() {
        let manager = FormulaManager::default();

        assert_eq!(
            parse(&manager, "a &\n  (b | )"),
            Err(ParseError {
                line: 2,
                column: 8,
                message: "expected a formula but found ')'".to_owned()
            })
        );
        assert_eq!(
            parse(&manager, "(a").unwrap_err().message,
            "expected ')' but found end of input"
        );
        assert_eq!(
            parse(&manager, "a b").unwrap_err().message,
            "unexpected identifier 'b' after the formula"
        );
        assert_eq!(
            parse(&manager, "a # b").unwrap_err().message,
            "unexpected character '#'"
        );
        assert_eq!(parse(&manager, "a =< b").unwrap_err().column, 3);
        assert!(parse(&manager, "").is_err());
    }
}
