// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::{
	algorithm::HashAlgorithm,
	error::OtpError,
	options::Options,
	otp::{counter_bytes, Otp, DEFAULT_DIGITS},
	secret::decode_secret,
};

/// Computes a HOTP code from raw key bytes.
pub fn hotp(
	key: &[u8],
	counter: u64,
	algorithm: HashAlgorithm,
	digits: usize,
) -> Result<Otp, OtpError> {
	let digest = algorithm.hmac(key, &counter_bytes(counter));
	Otp::from_digest(&digest, digits)
}

/// Parameters of a single HOTP computation.
///
/// `algorithm` is matched by name; unrecognized names fall back to SHA1.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HotpConfig {
	pub secret: String,
	pub counter: u64,
	pub digits: usize,
	pub algorithm: String,
}

impl HotpConfig {
	/// A SHA1, 6-digit configuration.
	pub fn new<S: Into<String>>(secret: S, counter: u64) -> Self {
		HotpConfig {
			secret: secret.into(),
			counter,
			digits: DEFAULT_DIGITS,
			algorithm: HashAlgorithm::Sha1.to_string(),
		}
	}

	pub fn with_digits(mut self, digits: usize) -> Self {
		self.digits = digits;
		self
	}

	pub fn with_algorithm<A: Into<String>>(mut self, algorithm: A) -> Self {
		self.algorithm = algorithm.into();
		self
	}

	/// Returns the same configuration with the counter advanced by one.
	pub fn next(&self) -> Result<Self, OtpError> {
		let counter = self
			.counter
			.checked_add(1)
			.ok_or(OtpError::CounterOverflow)?;
		Ok(HotpConfig {
			counter,
			..self.clone()
		})
	}
}

/// A hash-based One-Time Password (HOTP) generator.
///
/// The counter is part of the configuration and is never advanced by the
/// generator itself; persisting and incrementing it is up to the caller.
///
/// ```rust
/// use oathkit::{Hotp, HotpConfig, Options};
///
/// let config = HotpConfig::new("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ", 0);
/// let otp = Hotp::new(config).generate(&Options::default()).unwrap();
/// assert_eq!(otp, 755224);
/// assert_eq!(otp.to_string(), "755224");
/// ```
#[derive(Debug, Clone)]
pub struct Hotp {
	config: HotpConfig,
}

impl Hotp {
	pub fn new(config: HotpConfig) -> Self {
		Hotp { config }
	}

	#[inline]
	pub fn config(&self) -> &HotpConfig {
		&self.config
	}

	/// Calculate the OTP value for the configured counter.
	pub fn generate(&self, options: &Options) -> Result<Otp, OtpError> {
		let key = decode_secret(&self.config.secret)?;
		let algorithm = HashAlgorithm::from_name_or_default(&self.config.algorithm);
		log::debug!(
			"generating HOTP for {} ({algorithm}, {} digits, counter {})",
			options.label(),
			self.config.digits,
			self.config.counter
		);
		hotp(&key, self.config.counter, algorithm, self.config.digits)
	}
}
