// SPDX-License-Identifier: MIT OR Apache-2.0
use std::{
	error::Error,
	fmt::{self, Display, Formatter},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
	/// The secret or key is not valid Base32.
	SecretDecode,
	/// The named hash algorithm is not one of SHA1, SHA256 or SHA512.
	UnsupportedAlgorithm(String),
	/// A counter field was present but not a base-10 `u64`.
	InvalidCounter(String),
	InvalidDigits(usize),
	InvalidTimeStep(i64),
	HashTooShort,
	CounterOverflow,
	/// The OCRA suite string does not follow the RFC 6287 grammar.
	InvalidSuite(String),
	AlgorithmMismatch {
		suite: String,
		requested: String,
	},
	/// The suite requires a field that was left empty.
	MissingField(&'static str),
	/// A field was supplied that the suite does not allow.
	UnexpectedField(&'static str),
	InvalidField {
		field: &'static str,
		reason: String,
	},
}

impl Display for OtpError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			OtpError::SecretDecode => f.write_str("the secret is not valid base32"),
			OtpError::UnsupportedAlgorithm(name) => {
				write!(f, "unsupported hash algorithm {name:?}")
			}
			OtpError::InvalidCounter(counter) => {
				write!(f, "counter {counter:?} is not a base-10 unsigned integer")
			}
			OtpError::InvalidDigits(digits) => {
				write!(f, "cannot produce a code of {digits} digits, expected 1 to 9")
			}
			OtpError::InvalidTimeStep(step) => {
				write!(f, "time step must be a positive number of seconds, got {step}")
			}
			OtpError::HashTooShort => {
				f.write_str("the hmac output is too short for dynamic truncation")
			}
			OtpError::CounterOverflow => f.write_str("the HOTP counter has overflowed"),
			OtpError::InvalidSuite(reason) => write!(f, "invalid OCRA suite: {reason}"),
			OtpError::AlgorithmMismatch { suite, requested } => write!(
				f,
				"requested algorithm {requested} does not match the suite's {suite}"
			),
			OtpError::MissingField(field) => {
				write!(f, "the OCRA suite requires the {field} field")
			}
			OtpError::UnexpectedField(field) => {
				write!(f, "the OCRA suite does not allow the {field} field")
			}
			OtpError::InvalidField { field, reason } => {
				write!(f, "invalid OCRA {field}: {reason}")
			}
		}
	}
}

impl Error for OtpError {}
