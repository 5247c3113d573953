// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Credential token encoding used on the device command line.
//!
//! Each character becomes its code as two uppercase hex digits, and the
//! digits are joined with `-`. The network management card expects exactly
//! this form, so the output must not change.
//!
//! ```
//! use ups_bridge::codec::{decode_credential, encode_credential};
//!
//! let token = encode_credential("ab").unwrap();
//! assert_eq!(token, "61-62");
//! assert_eq!(decode_credential(&token).unwrap(), "ab");
//! ```

use crate::error::ValueError;

const SEPARATOR: char = '-';

/// Encodes a credential into its hyphen-joined hex token form.
///
/// An empty credential encodes to an empty string.
///
/// # Errors
///
/// Returns `ValueError::UnencodableCharacter` for characters above `U+00FF`,
/// which do not fit in two hex digits.
pub fn encode_credential(credential: &str) -> Result<String, ValueError> {
    let mut out = String::with_capacity(credential.len() * 3);
    for (i, c) in credential.chars().enumerate() {
        let code = u8::try_from(u32::from(c)).map_err(|_| ValueError::UnencodableCharacter(c))?;
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(&format!("{code:02X}"));
    }
    Ok(out)
}

/// Decodes a token produced by [`encode_credential`].
///
/// # Errors
///
/// Returns `ValueError::InvalidToken` if any segment is not exactly two hex
/// digits.
pub fn decode_credential(token: &str) -> Result<String, ValueError> {
    if token.is_empty() {
        return Ok(String::new());
    }
    token
        .split(SEPARATOR)
        .map(|part| {
            if part.len() != 2 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ValueError::InvalidToken(part.to_string()));
            }
            u8::from_str_radix(part, 16)
                .map(char::from)
                .map_err(|_| ValueError::InvalidToken(part.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_two_uppercase_digits_per_character() {
        assert_eq!(encode_credential("ab").unwrap(), "61-62");
        assert_eq!(encode_credential("apc").unwrap(), "61-70-63");
        assert_eq!(encode_credential("Z").unwrap(), "5A");
    }

    #[test]
    fn pads_low_codes_with_zero() {
        assert_eq!(encode_credential("\t\n").unwrap(), "09-0A");
        assert_eq!(encode_credential("\u{10}").unwrap(), "10");
    }

    #[test]
    fn latin1_is_accepted_wider_is_rejected() {
        assert_eq!(encode_credential("é").unwrap(), "E9");
        assert_eq!(
            encode_credential("a€"),
            Err(ValueError::UnencodableCharacter('€'))
        );
    }

    #[test]
    fn empty_credential_encodes_to_empty_token() {
        assert_eq!(encode_credential("").unwrap(), "");
        assert_eq!(decode_credential("").unwrap(), "");
    }

    #[test]
    fn encoding_is_deterministic() {
        let first = encode_credential("s3cr3t!").unwrap();
        let second = encode_credential("s3cr3t!").unwrap();
        assert_eq!(first, second);
        assert_eq!(decode_credential(&first).unwrap(), "s3cr3t!");
    }

    #[test]
    fn decode_rejects_malformed_tokens() {
        assert!(decode_credential("6-62").is_err());
        assert!(decode_credential("61--62").is_err());
        assert!(decode_credential("GG").is_err());
        assert!(decode_credential("616").is_err());
        assert!(decode_credential("+1").is_err());
    }

    #[test]
    fn decode_accepts_lowercase_digits() {
        assert_eq!(decode_credential("5a-7a").unwrap(), "Zz");
    }
}
