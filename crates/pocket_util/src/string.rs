use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StringError {
    #[error("Invalid hex string `{text}`: {message}")]
    InvalidHex { text: String, message: String },
    #[error("Hex string `{text}` decodes to {n_bytes} bytes, need {n_needed}")]
    TooShort {
        text: String,
        n_bytes: usize,
        n_needed: usize,
    },
}

/// MD5 digest as 32 lowercase hex characters.
pub fn md5_hex(txt: &str) -> String {
    hex::encode(md5::compute(txt.as_bytes()).0)
}

/// `XxYy` -> `xx_yy`, `XxYY` -> `xx_y_y`.
///
/// An underscore is inserted before every ASCII uppercase byte once a
/// non-underscore byte has been seen. Leading underscores are kept.
pub fn snake_string(s: &str) -> String {
    let mut l_bytes = Vec::with_capacity(s.len() * 2);
    let mut if_seen_word = false;
    for (idx, byte) in s.bytes().enumerate() {
        if idx > 0 && byte.is_ascii_uppercase() && if_seen_word {
            l_bytes.push(b'_');
        }
        if byte != b'_' {
            if_seen_word = true;
        }
        l_bytes.push(byte.to_ascii_lowercase());
    }
    String::from_utf8_lossy(&l_bytes).into_owned()
}

/// Character (not byte) index of the first occurrence of `sub` in `s`.
pub fn utf8_index(s: &str, sub: &str) -> Option<usize> {
    s.find(sub).map(|n_byte_idx| s[..n_byte_idx].chars().count())
}

fn decode_hex_prefix<const N: usize>(text: &str) -> Result<[u8; N], StringError> {
    let l_bytes = hex::decode(text).map_err(|err| {
        tracing::error!(text, error = %err, "Failed to decode hex string");
        StringError::InvalidHex {
            text: text.to_string(),
            message: err.to_string(),
        }
    })?;
    if l_bytes.len() < N {
        return Err(StringError::TooShort {
            text: text.to_string(),
            n_bytes: l_bytes.len(),
            n_needed: N,
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&l_bytes[..N]);
    Ok(arr)
}

/// Big-endian `u16` from the first 2 decoded bytes.
pub fn hex_str_to_u16(text: &str) -> Result<u16, StringError> {
    decode_hex_prefix::<2>(text).map(u16::from_be_bytes)
}

/// Big-endian `u32` from the first 4 decoded bytes.
pub fn hex_str_to_u32(text: &str) -> Result<u32, StringError> {
    decode_hex_prefix::<4>(text).map(u32::from_be_bytes)
}

/// Big-endian `u64` from the first 8 decoded bytes.
pub fn hex_str_to_u64(text: &str) -> Result<u64, StringError> {
    decode_hex_prefix::<8>(text).map(u64::from_be_bytes)
}
