// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::{
	algorithm::HashAlgorithm,
	error::OtpError,
	hotp::hotp,
	options::Options,
	otp::{Otp, DEFAULT_DIGITS},
	secret::decode_secret,
};
use std::{
	fmt,
	time::{SystemTime, UNIX_EPOCH},
};

pub const DEFAULT_TIME_STEP: i64 = 30;

/// Parameters of a TOTP computation.
///
/// `algorithm` is matched by name; unrecognized names fall back to SHA1.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TotpConfig {
	pub secret: String,
	/// Length of one time window, in seconds.
	pub time_step: i64,
	pub digits: usize,
	pub algorithm: String,
}

impl TotpConfig {
	/// A SHA1, 6-digit, 30-second configuration.
	pub fn new<S: Into<String>>(secret: S) -> Self {
		TotpConfig {
			secret: secret.into(),
			time_step: DEFAULT_TIME_STEP,
			digits: DEFAULT_DIGITS,
			algorithm: HashAlgorithm::Sha1.to_string(),
		}
	}

	pub fn with_time_step(mut self, time_step: i64) -> Self {
		self.time_step = time_step;
		self
	}

	pub fn with_digits(mut self, digits: usize) -> Self {
		self.digits = digits;
		self
	}

	pub fn with_algorithm<A: Into<String>>(mut self, algorithm: A) -> Self {
		self.algorithm = algorithm.into();
		self
	}

	fn step(&self) -> Result<u64, OtpError> {
		u64::try_from(self.time_step)
			.ok()
			.filter(|step| *step > 0)
			.ok_or(OtpError::InvalidTimeStep(self.time_step))
	}

	/// The moving factor for a unix time: `floor(time / time_step)`.
	pub fn counter_at(&self, time: u64) -> Result<u64, OtpError> {
		Ok(time / self.step()?)
	}
}

/// A Time-based One-Time Password (TOTP) generator.
///
/// The current time is read from a callback, so tests and embedded callers
/// can supply their own clock. [Totp::generate_at] bypasses the clock
/// entirely.
///
/// ```rust
/// use oathkit::{Options, Totp, TotpConfig};
///
/// let config = TotpConfig::new("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").with_digits(8);
/// let totp = Totp::with_clock(config, || 59);
/// assert_eq!(totp.generate(&Options::default()).unwrap().to_string(), "94287082");
/// ```
pub struct Totp {
	config: TotpConfig,
	time_callback: Box<dyn Fn() -> u64 + Send + Sync>,
}

impl Totp {
	/// Creates a TOTP instance that reads the [SystemTime].
	pub fn new(config: TotpConfig) -> Self {
		Self::with_clock(config, time_callback)
	}

	/// Creates a TOTP instance with a caller-provided clock returning
	/// seconds since the unix epoch.
	pub fn with_clock<C: Fn() -> u64 + Send + Sync + 'static>(
		config: TotpConfig,
		time_callback: C,
	) -> Self {
		Totp {
			config,
			time_callback: Box::new(time_callback),
		}
	}

	#[inline]
	pub fn config(&self) -> &TotpConfig {
		&self.config
	}

	/// Calculate the OTP value for the given time, represented as seconds from the unix epoch.
	pub fn generate_at(&self, time: u64, options: &Options) -> Result<Otp, OtpError> {
		let key = decode_secret(&self.config.secret)?;
		let counter = self.config.counter_at(time)?;
		let algorithm = HashAlgorithm::from_name_or_default(&self.config.algorithm);
		log::debug!(
			"generating TOTP for {} ({algorithm}, {} digits, step {}s, counter {counter})",
			options.label(),
			self.config.digits,
			self.config.time_step
		);
		hotp(&key, counter, algorithm, self.config.digits)
	}

	/// Calculate the OTP value for the given [SystemTime].
	pub fn generate_at_system_time(
		&self,
		system_time: SystemTime,
		options: &Options,
	) -> Result<Otp, OtpError> {
		self.generate_at(unix_seconds(system_time), options)
	}

	/// Calculate the OTP value for the current time.
	pub fn generate(&self, options: &Options) -> Result<Otp, OtpError> {
		self.generate_at((self.time_callback)(), options)
	}

	/// Seconds until the window containing `time` ends.
	pub fn remaining_at(&self, time: u64) -> Result<u64, OtpError> {
		let step = self.config.step()?;
		Ok(step - time % step)
	}

	/// Seconds until the current window ends.
	pub fn remaining(&self) -> Result<u64, OtpError> {
		self.remaining_at((self.time_callback)())
	}
}

impl fmt::Debug for Totp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Totp")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

fn unix_seconds(time: SystemTime) -> u64 {
	match time.duration_since(UNIX_EPOCH) {
		Ok(elapsed) => elapsed.as_secs(),
		Err(_) => {
			log::warn!("system time is before the unix epoch, using 0");
			0
		}
	}
}

fn time_callback() -> u64 {
	unix_seconds(SystemTime::now())
}

#[cfg(test)]
mod tests {
	use super::{Totp, TotpConfig};
	use crate::{
		error::OtpError,
		hotp::{Hotp, HotpConfig},
		options::Options,
	};
	use std::time::{Duration, UNIX_EPOCH};

	const SHA1_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
	const SHA256_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZA====";
	const SHA512_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNA=";

	fn rfc6238(secret: &str, algorithm: &str) -> Totp {
		Totp::new(
			TotpConfig::new(secret)
				.with_digits(8)
				.with_algorithm(algorithm),
		)
	}

	#[test]
	fn rfc6238_vectors() {
		let vectors = [
			(59, "94287082", "46119246", "90693936"),
			(1111111109, "07081804", "68084774", "25091201"),
			(1111111111, "14050471", "67062674", "99943326"),
			(1234567890, "89005924", "91819424", "93441116"),
			(2000000000, "69279037", "90698825", "38618901"),
			(20000000000, "65353130", "77737706", "47863826"),
		];
		let sha1 = rfc6238(SHA1_SECRET, "SHA1");
		let sha256 = rfc6238(SHA256_SECRET, "SHA256");
		let sha512 = rfc6238(SHA512_SECRET, "SHA512");
		let options = Options::default();
		for (time, a, b, c) in vectors {
			assert_eq!(sha1.generate_at(time, &options).unwrap().to_string(), a);
			assert_eq!(sha256.generate_at(time, &options).unwrap().to_string(), b);
			assert_eq!(sha512.generate_at(time, &options).unwrap().to_string(), c);
		}
	}

	#[test]
	fn system_time_matches_unix_seconds() {
		let totp = rfc6238(SHA1_SECRET, "SHA1");
		let at = UNIX_EPOCH + Duration::from_secs(1111111109);
		assert_eq!(
			totp.generate_at_system_time(at, &Options::default())
				.unwrap()
				.to_string(),
			"07081804"
		);
	}

	#[test]
	fn equivalent_to_hotp() {
		for step in [1, 30, 60, 3600] {
			for time in [0, 29, 30, 31, 1_700_000_000, u64::from(u32::MAX) * 7] {
				let totp = Totp::new(
					TotpConfig::new("JBSWY3DPEHPK3PXP")
						.with_time_step(step)
						.with_algorithm("SHA512"),
				);
				let hotp = Hotp::new(
					HotpConfig::new("JBSWY3DPEHPK3PXP", time / step as u64)
						.with_algorithm("SHA512"),
				);
				assert_eq!(
					totp.generate_at(time, &Options::default()).unwrap(),
					hotp.generate(&Options::default()).unwrap()
				);
			}
		}
	}

	#[test]
	fn injected_clock() {
		let config = TotpConfig::new(SHA1_SECRET).with_digits(8);
		let totp = Totp::with_clock(config, || 1234567890);
		assert_eq!(
			totp.generate(&Options::default()).unwrap().to_string(),
			"89005924"
		);
		assert_eq!(totp.remaining().unwrap(), 30);
		assert_eq!(totp.remaining_at(59).unwrap(), 1);
	}

	#[test]
	fn unknown_algorithm_falls_back_to_sha1() {
		let md5 = rfc6238(SHA1_SECRET, "MD5");
		assert_eq!(
			md5.generate_at(59, &Options::default()).unwrap().to_string(),
			"94287082"
		);
	}

	#[test]
	fn errors() {
		let options = Options::default();
		let bad_secret = Totp::new(TotpConfig::new("invalid1base32!"));
		assert_eq!(
			bad_secret.generate_at(59, &options),
			Err(OtpError::SecretDecode)
		);
		for step in [0, -30] {
			let totp = Totp::new(TotpConfig::new(SHA1_SECRET).with_time_step(step));
			assert_eq!(
				totp.generate_at(59, &options),
				Err(OtpError::InvalidTimeStep(step))
			);
			assert_eq!(totp.remaining_at(59), Err(OtpError::InvalidTimeStep(step)));
		}
		let too_long = Totp::new(TotpConfig::new(SHA1_SECRET).with_digits(12));
		assert_eq!(
			too_long.generate_at(59, &options),
			Err(OtpError::InvalidDigits(12))
		);
	}
}
