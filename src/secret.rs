// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::error::OtpError;
use base32::Alphabet;

/// Decodes a Base32 (RFC 4648 alphabet) secret into raw key bytes.
///
/// Decoding is case-insensitive. Trailing `=` padding is optional, but
/// when present it has to complete the final 8-character group.
/// Empty input, characters outside the alphabet, and lengths that
/// cannot encode a whole number of bytes are rejected.
///
/// ```rust
/// use oathkit::secret::decode_secret;
///
/// assert_eq!(decode_secret("nbswy3dp").unwrap(), b"hello");
/// assert!(decode_secret("invalid1base32!").is_err());
/// ```
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, OtpError> {
	let normalized = secret.trim_end_matches('=').to_ascii_uppercase();
	if normalized.is_empty() {
		return Err(OtpError::SecretDecode);
	}
	let padding = secret.len() - normalized.len();
	// Padded input must fill its last group with exactly the implied `=` count.
	if padding > 0 && padding != padding_for(normalized.len()) {
		return Err(OtpError::SecretDecode);
	}
	if !normalized
		.bytes()
		.all(|c| c.is_ascii_uppercase() || (b'2'..=b'7').contains(&c))
	{
		return Err(OtpError::SecretDecode);
	}
	// A trailing group of 1, 3 or 6 characters leaves dangling bits.
	if matches!(normalized.len() % 8, 1 | 3 | 6) {
		return Err(OtpError::SecretDecode);
	}
	base32::decode(Alphabet::RFC4648 { padding: false }, &normalized)
		.filter(|key| !key.is_empty())
		.ok_or(OtpError::SecretDecode)
}

fn padding_for(len: usize) -> usize {
	match len % 8 {
		2 => 6,
		4 => 4,
		5 => 3,
		7 => 1,
		_ => 0,
	}
}

#[cfg(test)]
mod tests {
	use super::decode_secret;
	use crate::error::OtpError;

	#[test]
	fn decodes_rfc4226_secret() {
		assert_eq!(
			decode_secret("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap(),
			b"12345678901234567890"
		);
	}

	#[test]
	fn case_and_padding_insensitive() {
		let upper = decode_secret("JBSWY3DPEHPK3PXP").unwrap();
		assert_eq!(decode_secret("jbswy3dpehpk3pxp").unwrap(), upper);
		assert_eq!(decode_secret("NBSWY3DP").unwrap(), b"hello");
		assert_eq!(decode_secret("MZXW6===").unwrap(), b"foo");
		assert_eq!(decode_secret("MZXW6").unwrap(), b"foo");
		assert_eq!(decode_secret("MY======").unwrap(), b"f");
		assert_eq!(decode_secret("mzxq====").unwrap(), b"fo");
		assert_eq!(decode_secret("MZXW6YQ=").unwrap(), b"foob");
	}

	#[test]
	fn rejects_malformed() {
		for bad in [
			"",
			"====",
			"invalid1base32!",
			"JBSW Y3DP",
			"JBSW=Y3DP",
			"ABC",
			"A",
			"MZXW6=======",
			"MZXW6=",
			"MZXW6==",
			"MZXW6======",
			"MY=====",
			"NBSWY3DP======",
			"GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ==",
		] {
			assert_eq!(decode_secret(bad), Err(OtpError::SecretDecode), "{bad:?}");
		}
	}
}
