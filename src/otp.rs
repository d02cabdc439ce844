// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::error::OtpError;
use constant_time_eq::constant_time_eq;
use std::{
	cmp::PartialEq,
	convert::AsRef,
	fmt::{self, Display, Formatter},
	ops::Deref,
};

/// The longest code that fits the `u32` modulus.
pub const MAX_DIGITS: usize = 9;
pub const DEFAULT_DIGITS: usize = 6;

/// Encodes a counter as the 8-byte big-endian moving factor.
#[inline]
pub fn counter_bytes(counter: u64) -> [u8; 8] {
	counter.to_be_bytes()
}

/// Dynamic truncation (RFC 4226 §5.3).
///
/// The low nibble of the last digest byte picks a 4-byte window, which is
/// read big-endian with the top bit cleared.
pub fn truncate(digest: &[u8]) -> Result<u32, OtpError> {
	let offset = (*digest.last().ok_or(OtpError::HashTooShort)? & 0xF) as usize;
	let window = digest
		.get(offset..offset + 4)
		.ok_or(OtpError::HashTooShort)?;
	let mut code = [0u8; 4];
	code.copy_from_slice(window);
	Ok(u32::from_be_bytes(code) & 0x7fff_ffff)
}

pub(crate) fn check_digits(digits: usize) -> Result<(), OtpError> {
	if (1..=MAX_DIGITS).contains(&digits) {
		Ok(())
	} else {
		Err(OtpError::InvalidDigits(digits))
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
/// A one-time password.
/// Can just be treated like a normal number, while also having a
/// [Display] implementation that shows it padded with zeroes.
pub struct Otp {
	code: u32,
	length: usize,
}

impl Otp {
	/// Reduces a truncated value to `digits` decimal digits.
	pub fn decimalize(value: u32, digits: usize) -> Result<Self, OtpError> {
		check_digits(digits)?;
		Ok(Self::new(value % 10_u32.pow(digits as u32), digits))
	}

	/// Truncates an HMAC digest and reduces it to `digits` decimal digits.
	pub fn from_digest(digest: &[u8], digits: usize) -> Result<Self, OtpError> {
		Self::decimalize(truncate(digest)?, digits)
	}

	#[inline]
	pub(crate) fn new(code: u32, length: usize) -> Self {
		Self { code, length }
	}

	/// The number of digits the code is rendered with.
	#[inline]
	pub fn digits(&self) -> usize {
		self.length
	}
}

impl Deref for Otp {
	type Target = u32;

	#[inline]
	fn deref(&self) -> &Self::Target {
		&self.code
	}
}

impl AsRef<u32> for Otp {
	#[inline]
	fn as_ref(&self) -> &u32 {
		&self.code
	}
}

impl PartialEq<u32> for Otp {
	#[inline]
	fn eq(&self, other: &u32) -> bool {
		constant_time_eq(&self.to_ne_bytes(), &other.to_ne_bytes())
	}
}

impl PartialEq<str> for Otp {
	fn eq(&self, other: &str) -> bool {
		constant_time_eq(self.to_string().as_bytes(), other.as_bytes())
	}
}

impl PartialEq<&str> for Otp {
	#[inline]
	fn eq(&self, other: &&str) -> bool {
		self == *other
	}
}

impl Display for Otp {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{:0width$}", self.code, width = self.length)
	}
}
