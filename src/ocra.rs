// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::{
	algorithm::HashAlgorithm,
	error::OtpError,
	options::Options,
	otp::{counter_bytes, Otp, MAX_DIGITS},
	secret::decode_secret,
};
use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

const VERSION: &str = "OCRA-1";
/// Size of the question field in the RFC 6287 message layout.
const QUESTION_BYTES: usize = 128;
const TIMESTAMP_BYTES: usize = 8;

/// How the challenge question is written.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QuestionFormat {
	Alphanumeric,
	Numeric,
	Hex,
}

impl QuestionFormat {
	fn accepts(self, c: char) -> bool {
		match self {
			QuestionFormat::Alphanumeric => c.is_ascii_alphanumeric(),
			QuestionFormat::Numeric => c.is_ascii_digit(),
			QuestionFormat::Hex => c.is_ascii_hexdigit(),
		}
	}
}

/// A parsed OCRA suite, e.g. `OCRA-1:HOTP-SHA1-6:QN08`.
///
/// The suite decides the hash, the number of digits and which data inputs
/// take part in the challenge message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcraSuite {
	suite: String,
	algorithm: HashAlgorithm,
	digits: usize,
	counter: bool,
	question: (QuestionFormat, usize),
	password: Option<HashAlgorithm>,
	session_info: Option<usize>,
	timestamp: Option<u64>,
}

impl OcraSuite {
	#[inline]
	pub fn algorithm(&self) -> HashAlgorithm {
		self.algorithm
	}

	/// Truncation length, between 4 and 9.
	#[inline]
	pub fn digits(&self) -> usize {
		self.digits
	}

	#[inline]
	pub fn uses_counter(&self) -> bool {
		self.counter
	}

	/// Format and maximum length of the challenge question.
	#[inline]
	pub fn question(&self) -> (QuestionFormat, usize) {
		self.question
	}

	#[inline]
	pub fn password_algorithm(&self) -> Option<HashAlgorithm> {
		self.password
	}

	/// Length in bytes of the session information, if any.
	#[inline]
	pub fn session_info_len(&self) -> Option<usize> {
		self.session_info
	}

	/// Length of the timestamp step in seconds, if any.
	#[inline]
	pub fn time_step(&self) -> Option<u64> {
		self.timestamp
	}

	/// Hashes a PIN with the suite's password algorithm, hex-encoded.
	pub fn password_hash(&self, pin: &str) -> Result<String, OtpError> {
		let algorithm = self.password.ok_or(OtpError::UnexpectedField("password"))?;
		Ok(hex::encode(algorithm.digest(pin.as_bytes())))
	}

	/// The hex timestamp field for a unix time.
	pub fn timestamp_at(&self, time: u64) -> Result<String, OtpError> {
		let step = self.timestamp.ok_or(OtpError::UnexpectedField("timestamp"))?;
		Ok(format!("{:x}", time / step))
	}
}

impl Display for OcraSuite {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.suite)
	}
}

fn invalid_suite(reason: impl Into<String>) -> OtpError {
	OtpError::InvalidSuite(reason.into())
}

fn parse_number<T: FromStr>(digits: &str, token: &str) -> Result<T, OtpError> {
	if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
		return Err(invalid_suite(format!("malformed data input {token:?}")));
	}
	digits
		.parse()
		.map_err(|_| invalid_suite(format!("malformed data input {token:?}")))
}

fn parse_timestamp(token: &str, step: &str) -> Result<u64, OtpError> {
	let (amount, unit) = step.split_at(step.len().saturating_sub(1));
	let amount: u64 = parse_number(amount, token)?;
	let (max, seconds) = match unit {
		"S" => (59, 1),
		"M" => (59, 60),
		"H" => (48, 3600),
		_ => return Err(invalid_suite(format!("unknown time step unit in {token:?}"))),
	};
	if !(1..=max).contains(&amount) {
		return Err(invalid_suite(format!("time step out of range in {token:?}")));
	}
	Ok(amount * seconds)
}

impl FromStr for OcraSuite {
	type Err = OtpError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if !s.is_ascii() {
			return Err(invalid_suite("suite must be ASCII"));
		}
		let mut parts = s.split(':');
		let (Some(version), Some(function), Some(data_input), None) =
			(parts.next(), parts.next(), parts.next(), parts.next())
		else {
			return Err(invalid_suite("expected <version>:<function>:<data input>"));
		};
		if version != VERSION {
			return Err(invalid_suite(format!("unsupported version {version:?}")));
		}

		let mut function = function.split('-');
		let (Some("HOTP"), Some(hash), Some(truncation), None) = (
			function.next(),
			function.next(),
			function.next(),
			function.next(),
		) else {
			return Err(invalid_suite("crypto function must be HOTP-<hash>-<digits>"));
		};
		let algorithm = HashAlgorithm::from_suite_token(hash)?;
		let digits: usize = parse_number(truncation, truncation)?;
		// Untruncated (0) and 10-digit responses don't fit a u32 decimal code.
		if !(4..=MAX_DIGITS).contains(&digits) {
			return Err(invalid_suite(format!("truncation length {digits} out of range")));
		}

		let mut suite = OcraSuite {
			suite: s.to_owned(),
			algorithm,
			digits,
			counter: false,
			question: (QuestionFormat::Numeric, 0),
			password: None,
			session_info: None,
			timestamp: None,
		};
		let mut has_question = false;
		// Data inputs must appear in C, Q, P, S, T order, each at most once.
		let mut rank = 0;
		for token in data_input.split('-') {
			let (next_rank, rest) = match token.split_at(token.len().min(1)) {
				("C", "") => (1, ""),
				("Q", rest) => (2, rest),
				("P", rest) => (3, rest),
				("S", rest) => (4, rest),
				("T", rest) => (5, rest),
				_ => return Err(invalid_suite(format!("unknown data input {token:?}"))),
			};
			if next_rank <= rank {
				return Err(invalid_suite(format!("data input {token:?} is out of order")));
			}
			rank = next_rank;
			match next_rank {
				1 => suite.counter = true,
				2 => {
					let (format, length) = rest.split_at(rest.len().min(1));
					let format = match format {
						"A" => QuestionFormat::Alphanumeric,
						"N" => QuestionFormat::Numeric,
						"H" => QuestionFormat::Hex,
						_ => {
							return Err(invalid_suite(format!(
								"unknown question format in {token:?}"
							)))
						}
					};
					if length.len() != 2 {
						return Err(invalid_suite(format!(
							"question length must have 2 digits in {token:?}"
						)));
					}
					let length: usize = parse_number(length, token)?;
					if !(4..=64).contains(&length) {
						return Err(invalid_suite(format!(
							"question length out of range in {token:?}"
						)));
					}
					suite.question = (format, length);
					has_question = true;
				}
				3 => suite.password = Some(HashAlgorithm::from_suite_token(rest)?),
				4 => {
					if rest.len() != 3 {
						return Err(invalid_suite(format!(
							"session info length must have 3 digits in {token:?}"
						)));
					}
					let length: usize = parse_number(rest, token)?;
					if length == 0 {
						return Err(invalid_suite("session info length must be positive"));
					}
					suite.session_info = Some(length);
				}
				_ => suite.timestamp = Some(parse_timestamp(token, rest)?),
			}
		}
		if !has_question {
			return Err(invalid_suite("data input must include a question"));
		}
		Ok(suite)
	}
}

/// Byte layout of the challenge message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageEncoding {
	/// Fields are appended as given, with no separator and no padding:
	/// suite, counter (8 bytes), question, password, session info, timestamp.
	#[default]
	Concatenated,
	/// The RFC 6287 §5 layout. The suite is followed by a `0x00` byte, the
	/// question is converted per its format and zero-padded to 128 bytes, and
	/// the password, session info and timestamp are hex strings left-padded to
	/// their declared sizes.
	Rfc6287,
}

/// Parameters of an OCRA computation.
///
/// Empty strings mean "not supplied". An empty `algorithm` takes the hash
/// from the suite; otherwise it has to name the suite's hash.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OcraConfig {
	pub suite: String,
	pub secret_key: String,
	/// Base-10 counter value.
	pub counter: String,
	pub question: String,
	pub password: String,
	pub session_info: String,
	pub timestamp: String,
	pub algorithm: String,
	pub encoding: MessageEncoding,
}

impl OcraConfig {
	pub fn new<S: Into<String>, K: Into<String>>(suite: S, secret_key: K) -> Self {
		OcraConfig {
			suite: suite.into(),
			secret_key: secret_key.into(),
			..Default::default()
		}
	}

	pub fn with_counter<C: ToString>(mut self, counter: C) -> Self {
		self.counter = counter.to_string();
		self
	}

	pub fn with_question<Q: Into<String>>(mut self, question: Q) -> Self {
		self.question = question.into();
		self
	}

	pub fn with_password<P: Into<String>>(mut self, password: P) -> Self {
		self.password = password.into();
		self
	}

	pub fn with_session_info<S: Into<String>>(mut self, session_info: S) -> Self {
		self.session_info = session_info.into();
		self
	}

	pub fn with_timestamp<T: Into<String>>(mut self, timestamp: T) -> Self {
		self.timestamp = timestamp.into();
		self
	}

	pub fn with_algorithm<A: Into<String>>(mut self, algorithm: A) -> Self {
		self.algorithm = algorithm.into();
		self
	}

	pub fn with_encoding(mut self, encoding: MessageEncoding) -> Self {
		self.encoding = encoding;
		self
	}
}

fn check_presence(field: &'static str, value: &str, allowed: bool) -> Result<(), OtpError> {
	match (allowed, value.is_empty()) {
		(true, true) => Err(OtpError::MissingField(field)),
		(false, false) => Err(OtpError::UnexpectedField(field)),
		_ => Ok(()),
	}
}

fn check_question(suite: &OcraSuite, question: &str) -> Result<(), OtpError> {
	let (format, max) = suite.question;
	if question.len() > max {
		return Err(OtpError::InvalidField {
			field: "question",
			reason: format!("longer than {max} characters"),
		});
	}
	if !question.chars().all(|c| format.accepts(c)) {
		return Err(OtpError::InvalidField {
			field: "question",
			reason: format!("not in {format:?} format"),
		});
	}
	Ok(())
}

/// Decodes a hex field, left-padded with zeros to `width` bytes.
fn hex_field(field: &'static str, value: &str, width: usize) -> Result<Vec<u8>, OtpError> {
	if value.len() > width * 2 {
		return Err(OtpError::InvalidField {
			field,
			reason: format!("longer than {width} bytes"),
		});
	}
	hex::decode(format!("{value:0>w$}", w = width * 2)).map_err(|e| OtpError::InvalidField {
		field,
		reason: e.to_string(),
	})
}

/// Converts a decimal string of any length to uppercase hex.
fn decimal_to_hex(decimal: &str) -> String {
	const NIBBLES: &[u8; 16] = b"0123456789ABCDEF";
	let mut digits: Vec<u32> = decimal.bytes().map(|c| u32::from(c - b'0')).collect();
	let mut nibbles = Vec::new();
	while digits.iter().any(|&d| d != 0) {
		let mut remainder = 0;
		for digit in digits.iter_mut() {
			let acc = remainder * 10 + *digit;
			*digit = acc / 16;
			remainder = acc % 16;
		}
		nibbles.push(NIBBLES[remainder as usize]);
	}
	if nibbles.is_empty() {
		return String::from("0");
	}
	nibbles.iter().rev().map(|&c| char::from(c)).collect()
}

fn question_bytes(suite: &OcraSuite, question: &str) -> Result<Vec<u8>, OtpError> {
	let encoded = match suite.question.0 {
		QuestionFormat::Numeric => decimal_to_hex(question),
		QuestionFormat::Alphanumeric => hex::encode(question),
		QuestionFormat::Hex => question.to_owned(),
	};
	if encoded.len() > QUESTION_BYTES * 2 {
		return Err(OtpError::InvalidField {
			field: "question",
			reason: format!("longer than {QUESTION_BYTES} bytes"),
		});
	}
	hex::decode(format!("{encoded:0<w$}", w = QUESTION_BYTES * 2)).map_err(|e| {
		OtpError::InvalidField {
			field: "question",
			reason: e.to_string(),
		}
	})
}

/// Builds the challenge message after checking the config against the suite.
pub fn build_message(suite: &OcraSuite, config: &OcraConfig) -> Result<Vec<u8>, OtpError> {
	let counter = if config.counter.is_empty() {
		None
	} else {
		let value = config
			.counter
			.parse::<u64>()
			.map_err(|_| OtpError::InvalidCounter(config.counter.clone()))?;
		Some(value)
	};
	check_presence("counter", &config.counter, suite.counter)?;
	check_presence("question", &config.question, true)?;
	check_question(suite, &config.question)?;
	check_presence("password", &config.password, suite.password.is_some())?;
	check_presence("session info", &config.session_info, suite.session_info.is_some())?;
	check_presence("timestamp", &config.timestamp, suite.timestamp.is_some())?;

	let mut message = suite.suite.as_bytes().to_vec();
	match config.encoding {
		MessageEncoding::Concatenated => {
			if let Some(counter) = counter {
				message.extend_from_slice(&counter_bytes(counter));
			}
			for field in [
				&config.question,
				&config.password,
				&config.session_info,
				&config.timestamp,
			] {
				message.extend_from_slice(field.as_bytes());
			}
		}
		MessageEncoding::Rfc6287 => {
			message.push(0x00);
			if let Some(counter) = counter {
				message.extend_from_slice(&counter_bytes(counter));
			}
			message.extend(question_bytes(suite, &config.question)?);
			if let Some(algorithm) = suite.password {
				message.extend(hex_field(
					"password",
					&config.password,
					algorithm.digest_size(),
				)?);
			}
			if let Some(length) = suite.session_info {
				message.extend(hex_field("session info", &config.session_info, length)?);
			}
			if suite.timestamp.is_some() {
				message.extend(hex_field("timestamp", &config.timestamp, TIMESTAMP_BYTES)?);
			}
		}
	}
	log::trace!(
		"built {:?} OCRA message of {} bytes",
		config.encoding,
		message.len()
	);
	Ok(message)
}

/// An OATH Challenge-Response Algorithm (OCRA) generator.
///
/// ```rust
/// use oathkit::{ocra::MessageEncoding, Ocra, OcraConfig, Options};
///
/// let config = OcraConfig::new("OCRA-1:HOTP-SHA1-6:QN08", "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ")
/// 	.with_question("00000000")
/// 	.with_encoding(MessageEncoding::Rfc6287);
/// let otp = Ocra::new(config).generate(&Options::default()).unwrap();
/// assert_eq!(otp.to_string(), "237653");
/// ```
#[derive(Debug, Clone)]
pub struct Ocra {
	config: OcraConfig,
}

impl Ocra {
	pub fn new(config: OcraConfig) -> Self {
		Ocra { config }
	}

	#[inline]
	pub fn config(&self) -> &OcraConfig {
		&self.config
	}

	/// Calculate the response for the configured challenge.
	pub fn generate(&self, options: &Options) -> Result<Otp, OtpError> {
		let key = decode_secret(&self.config.secret_key)?;
		let requested = if self.config.algorithm.is_empty() {
			None
		} else {
			Some(self.config.algorithm.parse::<HashAlgorithm>()?)
		};
		let suite: OcraSuite = self.config.suite.parse()?;
		if let Some(requested) = requested.filter(|alg| *alg != suite.algorithm) {
			return Err(OtpError::AlgorithmMismatch {
				suite: suite.algorithm.to_string(),
				requested: requested.to_string(),
			});
		}
		log::debug!("generating OCRA for {} ({suite})", options.label());
		let message = build_message(&suite, &self.config)?;
		let digest = suite.algorithm.hmac(&key, &message);
		Otp::from_digest(&digest, suite.digits)
	}
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
	use super::{MessageEncoding, Ocra, OcraConfig};
	use crate::options::Options;

	#[test]
	fn config_from_json() {
		let config: OcraConfig = serde_json::from_str(
			r#"{
				"suite": "OCRA-1:HOTP-SHA1-6:QN08",
				"secret_key": "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ",
				"question": "11111111",
				"encoding": "Rfc6287"
			}"#,
		)
		.unwrap();
		assert_eq!(config.encoding, MessageEncoding::Rfc6287);
		assert!(config.counter.is_empty());
		let otp = Ocra::new(config).generate(&Options::default()).unwrap();
		assert_eq!(otp.to_string(), "243178");
	}
}
