// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::error::OtpError;
use digest::{core_api::BlockSizeUser, Digest, Key, KeyInit};
use hmac::{Mac, SimpleHmac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

/// The hash function backing the HMAC of an OTP computation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum HashAlgorithm {
	#[default]
	Sha1,
	Sha256,
	Sha512,
}

impl HashAlgorithm {
	/// Parses an algorithm name, falling back to SHA1 for anything unrecognized.
	///
	/// This is the HOTP/TOTP selection policy. OCRA configs use the strict
	/// [FromStr] implementation instead and reject unknown names.
	pub fn from_name_or_default(name: &str) -> Self {
		name.parse().unwrap_or_else(|_| {
			if !name.is_empty() {
				log::warn!("unknown hash algorithm {name:?}, falling back to SHA1");
			}
			HashAlgorithm::Sha1
		})
	}

	/// Parses the upper-case hash token of an OCRA suite, e.g. `SHA256`.
	pub fn from_suite_token(token: &str) -> Result<Self, OtpError> {
		match token {
			"SHA1" => Ok(HashAlgorithm::Sha1),
			"SHA256" => Ok(HashAlgorithm::Sha256),
			"SHA512" => Ok(HashAlgorithm::Sha512),
			_ => Err(OtpError::UnsupportedAlgorithm(token.to_owned())),
		}
	}

	/// Size of the digest in bytes.
	pub fn digest_size(self) -> usize {
		match self {
			HashAlgorithm::Sha1 => 20,
			HashAlgorithm::Sha256 => 32,
			HashAlgorithm::Sha512 => 64,
		}
	}

	/// Size of the digest in bits.
	#[inline]
	pub fn digest_bits(self) -> usize {
		self.digest_size() * 8
	}

	/// Computes `HMAC(key, message)` with this hash.
	pub fn hmac(self, key: &[u8], message: &[u8]) -> Vec<u8> {
		match self {
			HashAlgorithm::Sha1 => keyed::<Sha1>(key, message),
			HashAlgorithm::Sha256 => keyed::<Sha256>(key, message),
			HashAlgorithm::Sha512 => keyed::<Sha512>(key, message),
		}
	}

	/// Computes the plain (unkeyed) digest of `data`.
	pub fn digest(self, data: &[u8]) -> Vec<u8> {
		match self {
			HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
			HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
			HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
		}
	}
}

fn keyed<D: Digest + BlockSizeUser>(key: &[u8], message: &[u8]) -> Vec<u8> {
	// RFC 2104: keys longer than a block are hashed first, then zero-padded.
	let mut block = Key::<SimpleHmac<D>>::default();
	if key.len() > block.len() {
		let hashed = D::digest(key);
		block[..hashed.len()].copy_from_slice(&hashed);
	} else {
		block[..key.len()].copy_from_slice(key);
	}
	let mut hasher = <SimpleHmac<D> as KeyInit>::new(&block);
	hasher.update(message);
	hasher.finalize().into_bytes().to_vec()
}

impl FromStr for HashAlgorithm {
	type Err = OtpError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().replace('-', "").as_str() {
			"SHA1" => Ok(HashAlgorithm::Sha1),
			"SHA256" => Ok(HashAlgorithm::Sha256),
			"SHA512" => Ok(HashAlgorithm::Sha512),
			_ => Err(OtpError::UnsupportedAlgorithm(s.to_owned())),
		}
	}
}

impl Display for HashAlgorithm {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			HashAlgorithm::Sha1 => "SHA1",
			HashAlgorithm::Sha256 => "SHA256",
			HashAlgorithm::Sha512 => "SHA512",
		})
	}
}

#[cfg(test)]
mod tests {
	use super::HashAlgorithm;
	use crate::error::OtpError;

	#[test]
	fn parse_names() {
		assert_eq!("SHA1".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha1));
		assert_eq!("sha256".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha256));
		assert_eq!("SHA-512".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha512));
		assert_eq!(
			"MD5".parse::<HashAlgorithm>(),
			Err(OtpError::UnsupportedAlgorithm("MD5".into()))
		);
	}

	#[test]
	fn lenient_parse_falls_back_to_sha1() {
		assert_eq!(HashAlgorithm::from_name_or_default("MD5"), HashAlgorithm::Sha1);
		assert_eq!(HashAlgorithm::from_name_or_default(""), HashAlgorithm::Sha1);
		assert_eq!(
			HashAlgorithm::from_name_or_default("SHA512"),
			HashAlgorithm::Sha512
		);
	}

	#[test]
	fn output_sizes() {
		for alg in [HashAlgorithm::Sha1, HashAlgorithm::Sha256, HashAlgorithm::Sha512] {
			let mac = alg.hmac(b"key", b"message");
			assert_eq!(mac.len(), alg.digest_size());
			assert_eq!(alg.digest(b"message").len() * 8, alg.digest_bits());
		}
	}

	#[test]
	fn hmac_sha1_known_value() {
		// RFC 2202 test case 2
		let mac = HashAlgorithm::Sha1.hmac(b"Jefe", b"what do ya want for nothing?");
		assert_eq!(hex::encode(mac), "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
	}

	#[test]
	fn hmac_key_lengths() {
		// RFC 2202 test case 6 and RFC 4231 test case 6: keys longer than a block.
		let message = b"Test Using Larger Than Block-Size Key - Hash Key First";
		assert_eq!(
			hex::encode(HashAlgorithm::Sha1.hmac(&[0xaa; 80], message)),
			"aa4ae5e15272d00e95705637ce8a3b55ed402112"
		);
		assert_eq!(
			hex::encode(HashAlgorithm::Sha512.hmac(&[0xaa; 131], message)),
			"80b24263c7c1a3ebb71493c1dd7be8b49b46d1f41b4aeec1121b013783f8f352\
			 6b56d037e05f2598bd0fd2215d6a1e5295e64f73f63f0aec8b915a985d786598"
		);
		assert_eq!(
			hex::encode(HashAlgorithm::Sha256.hmac(&[], b"message")),
			"eb08c1f56d5ddee07f7bdf80468083da06b64cf4fac64fe3a90883df5feacae4"
		);
	}

	#[test]
	fn suite_tokens_are_exact() {
		assert_eq!(
			HashAlgorithm::from_suite_token("SHA256"),
			Ok(HashAlgorithm::Sha256)
		);
		for token in ["sha1", "Sha512", "SHA-1", ""] {
			assert_eq!(
				HashAlgorithm::from_suite_token(token),
				Err(OtpError::UnsupportedAlgorithm(token.into()))
			);
		}
	}
}
