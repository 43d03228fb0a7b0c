//! Condition DSL parser.
//!
//! Recursive descent over `operand operator (operand | number)`, e.g.
//! `RSI(14) > 70`, `close CROSSES_ABOVE SMA(50)` or
//! `MACD(12,26,9).histogram >= 0`. Indicator names and operators are
//! case-insensitive; empty parentheses take the indicator's defaults.
//! Errors carry the byte offset of the offending token.

use crate::domain::condition::{Condition, Operator};
use crate::domain::error::ParseError;
use crate::domain::indicator::{
    bollinger, macd, stochastic, Band, IndicatorKind, IndicatorSpec, MacdLine, StochasticLine,
};
use crate::domain::ohlcv::PriceField;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.pos,
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}', found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn consume_char(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek_word(&self) -> &'a str {
        let remaining = self.remaining();
        let end = remaining
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(remaining.len());
        &remaining[..end]
    }

    fn describe_next(&self) -> String {
        let word = self.peek_word();
        if !word.is_empty() {
            word.to_string()
        } else {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_period(&mut self) -> Result<usize, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let num_str = &self.input[start..self.pos];
        if num_str.is_empty() {
            return Err(ParseError {
                message: format!("expected integer, found '{}'", self.describe_next()),
                position: start,
            });
        }
        match num_str.parse::<usize>() {
            Ok(0) => Err(ParseError {
                message: "period must be at least 1".to_string(),
                position: start,
            }),
            Ok(n) => Ok(n),
            Err(_) => Err(ParseError {
                message: format!("invalid integer: {}", num_str),
                position: start,
            }),
        }
    }

    /// `(` followed directly by `)` means "use the defaults".
    fn open_params(&mut self) -> Result<bool, ParseError> {
        self.expect_char('(')?;
        Ok(!self.consume_char(')'))
    }

    fn parse_selector(&mut self) -> Result<Option<(&'a str, usize)>, ParseError> {
        if !self.consume_char('.') {
            return Ok(None);
        }
        self.skip_whitespace();
        let at = self.pos;
        let word = self.peek_word();
        if word.is_empty() {
            return Err(self.error(format!("expected selector, found '{}'", self.describe_next())));
        }
        self.pos += word.len();
        Ok(Some((word, at)))
    }

    fn parse_price_field(&mut self) -> Result<PriceField, ParseError> {
        self.skip_whitespace();
        let word = self.peek_word();
        let field = match word.to_ascii_lowercase().as_str() {
            "open" => PriceField::Open,
            "high" => PriceField::High,
            "low" => PriceField::Low,
            "close" => PriceField::Close,
            _ => {
                return Err(self.error(format!(
                    "expected price field (open, high, low, close), found '{}'",
                    self.describe_next()
                )));
            }
        };
        self.pos += word.len();
        Ok(field)
    }

    fn parse_single_period(&mut self, kind: IndicatorKind) -> Result<IndicatorSpec, ParseError> {
        let spec = IndicatorSpec::with_defaults(kind);
        if !self.open_params()? {
            return Ok(spec);
        }
        let period = self.parse_period()?;
        self.expect_char(')')?;
        Ok(match kind {
            IndicatorKind::Sma => IndicatorSpec::Sma { period },
            IndicatorKind::Ema => IndicatorSpec::Ema { period },
            IndicatorKind::Rsi => IndicatorSpec::Rsi { period },
            IndicatorKind::Atr => IndicatorSpec::Atr { period },
            IndicatorKind::Adx => IndicatorSpec::Adx { period },
            _ => spec,
        })
    }

    fn parse_macd(&mut self) -> Result<IndicatorSpec, ParseError> {
        let mut fast = macd::DEFAULT_FAST;
        let mut slow = macd::DEFAULT_SLOW;
        let mut signal = macd::DEFAULT_SIGNAL;
        let mut line = MacdLine::Macd;
        if self.open_params()? {
            fast = self.parse_period()?;
            self.expect_char(',')?;
            slow = self.parse_period()?;
            self.expect_char(',')?;
            signal = self.parse_period()?;
            self.expect_char(')')?;
        }
        if let Some((word, at)) = self.parse_selector()? {
            line = match word.to_ascii_lowercase().as_str() {
                "macd" => MacdLine::Macd,
                "signal" => MacdLine::Signal,
                "histogram" => MacdLine::Histogram,
                _ => {
                    return Err(ParseError {
                        message: format!("expected macd, signal or histogram, found '{}'", word),
                        position: at,
                    });
                }
            };
        }
        Ok(IndicatorSpec::Macd {
            fast,
            slow,
            signal,
            line,
        })
    }

    fn parse_bollinger(&mut self) -> Result<IndicatorSpec, ParseError> {
        let mut period = bollinger::DEFAULT_PERIOD;
        let mut std_dev = bollinger::DEFAULT_STD_DEV;
        let mut band = Band::Middle;
        if self.open_params()? {
            period = self.parse_period()?;
            self.expect_char(',')?;
            self.skip_whitespace();
            let at = self.pos;
            std_dev = self.parse_number()?;
            if std_dev <= 0.0 {
                return Err(ParseError {
                    message: "standard deviation multiplier must be positive".to_string(),
                    position: at,
                });
            }
            self.expect_char(')')?;
        }
        if let Some((word, at)) = self.parse_selector()? {
            band = match word.to_ascii_lowercase().as_str() {
                "upper" => Band::Upper,
                "middle" => Band::Middle,
                "lower" => Band::Lower,
                _ => {
                    return Err(ParseError {
                        message: format!("expected upper, middle or lower, found '{}'", word),
                        position: at,
                    });
                }
            };
        }
        Ok(IndicatorSpec::Bollinger {
            period,
            std_dev,
            band,
        })
    }

    fn parse_stochastic(&mut self) -> Result<IndicatorSpec, ParseError> {
        let mut k_period = stochastic::DEFAULT_K_PERIOD;
        let mut d_period = stochastic::DEFAULT_D_PERIOD;
        let mut line = StochasticLine::K;
        if self.open_params()? {
            k_period = self.parse_period()?;
            self.expect_char(',')?;
            d_period = self.parse_period()?;
            self.expect_char(')')?;
        }
        if let Some((word, at)) = self.parse_selector()? {
            line = match word.to_ascii_lowercase().as_str() {
                "k" => StochasticLine::K,
                "d" => StochasticLine::D,
                _ => {
                    return Err(ParseError {
                        message: format!("expected k or d, found '{}'", word),
                        position: at,
                    });
                }
            };
        }
        Ok(IndicatorSpec::Stochastic {
            k_period,
            d_period,
            line,
        })
    }

    fn parse_operand(&mut self) -> Result<IndicatorSpec, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let word = self.peek_word();
        let upper = word.to_ascii_uppercase();
        self.pos += word.len();

        match upper.as_str() {
            "SMA" => self.parse_single_period(IndicatorKind::Sma),
            "EMA" => self.parse_single_period(IndicatorKind::Ema),
            "RSI" => self.parse_single_period(IndicatorKind::Rsi),
            "ATR" => self.parse_single_period(IndicatorKind::Atr),
            "ADX" => self.parse_single_period(IndicatorKind::Adx),
            "MACD" => self.parse_macd(),
            "BOLLINGER" => self.parse_bollinger(),
            "STOCHASTIC" => self.parse_stochastic(),
            "VOLUME" => Ok(IndicatorSpec::Volume),
            "PRICE" => {
                self.expect_char('(')?;
                let field = self.parse_price_field()?;
                self.expect_char(')')?;
                Ok(IndicatorSpec::Price { field })
            }
            "OPEN" | "HIGH" | "LOW" | "CLOSE" => {
                self.pos = start;
                let field = self.parse_price_field()?;
                Ok(IndicatorSpec::Price { field })
            }
            _ => {
                self.pos = start;
                Err(self.error(format!("expected indicator, found '{}'", self.describe_next())))
            }
        }
    }

    fn parse_operator(&mut self) -> Result<Operator, ParseError> {
        self.skip_whitespace();
        for (text, op) in [
            (">=", Operator::GreaterEqual),
            ("<=", Operator::LessEqual),
            ("==", Operator::Equals),
            (">", Operator::GreaterThan),
            ("<", Operator::LessThan),
        ] {
            if self.remaining().starts_with(text) {
                self.pos += text.len();
                return Ok(op);
            }
        }
        let word = self.peek_word();
        let op = match word.to_ascii_uppercase().as_str() {
            "CROSSES_ABOVE" => Operator::CrossesAbove,
            "CROSSES_BELOW" => Operator::CrossesBelow,
            _ => {
                return Err(self.error(format!(
                    "expected operator (>, <, ==, >=, <=, CROSSES_ABOVE, CROSSES_BELOW), found '{}'",
                    self.describe_next()
                )));
            }
        };
        self.pos += word.len();
        Ok(op)
    }

    fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let indicator1 = self.parse_operand()?;
        let operator = self.parse_operator()?;
        self.skip_whitespace();
        let numeric = matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '-' || c == '.');
        let condition = if numeric {
            let value = self.parse_number()?;
            Condition::against_value(indicator1, operator, value)
        } else {
            let indicator2 = self.parse_operand()?;
            Condition::against_indicator(indicator1, operator, indicator2)
        };

        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(format!(
                "unexpected input after condition: '{}'",
                self.remaining()
            )));
        }
        Ok(condition)
    }
}

pub fn parse_condition(input: &str) -> Result<Condition, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse_condition()
}
