/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use thiserror::Error;

const MAX_NAME_LENGTH: usize = 255;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("empty name")]
    Empty,
    #[error("name too long: {0} > 255")]
    TooLong(usize),
    #[error("should start with an ascii letter, found {0:?}")]
    InvalidFirstChar(char),
    #[error("invalid char {0:?}")]
    InvalidChar(char),
}

/// Instrument names start with an ascii letter, followed by ascii letters,
/// digits or one of `_.-/`.
pub fn validate_instrument_name(name: &str) -> Result<(), NameError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(NameError::Empty);
    };
    if name.len() > MAX_NAME_LENGTH {
        return Err(NameError::TooLong(name.len()));
    }
    if !first.is_ascii_alphabetic() {
        return Err(NameError::InvalidFirstChar(first));
    }
    for c in chars {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '/' => {}
            _ => return Err(NameError::InvalidChar(c)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid() {
        assert!(validate_instrument_name("hello").is_ok());
        assert!(validate_instrument_name("http.server/duration_ms-2").is_ok());
        assert!(validate_instrument_name(&"a".repeat(255)).is_ok());
    }

    #[test]
    fn invalid() {
        assert_eq!(validate_instrument_name(""), Err(NameError::Empty));
        assert_eq!(
            validate_instrument_name(&"a".repeat(256)),
            Err(NameError::TooLong(256))
        );
        assert_eq!(
            validate_instrument_name("1abc"),
            Err(NameError::InvalidFirstChar('1'))
        );
        assert_eq!(
            validate_instrument_name("_abc"),
            Err(NameError::InvalidFirstChar('_'))
        );
        assert_eq!(
            validate_instrument_name("ab c"),
            Err(NameError::InvalidChar(' '))
        );
        assert_eq!(
            validate_instrument_name("café"),
            Err(NameError::InvalidChar('é'))
        );
    }
}
