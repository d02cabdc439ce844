// SPDX-License-Identifier: MIT OR Apache-2.0

/// Display metadata accompanying a generation call.
///
/// These fields never influence the computed code. They are carried so that
/// callers building provisioning URIs or account listings can pass the same
/// value everywhere; the generators only mention them in debug logs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
	pub issuer: String,
	pub account_name: String,
}

impl Options {
	pub fn new<I: Into<String>, A: Into<String>>(issuer: I, account_name: A) -> Self {
		Options {
			issuer: issuer.into(),
			account_name: account_name.into(),
		}
	}

	pub(crate) fn label(&self) -> String {
		match (self.issuer.is_empty(), self.account_name.is_empty()) {
			(true, true) => String::from("<unlabelled>"),
			(false, true) => self.issuer.clone(),
			(true, false) => self.account_name.clone(),
			(false, false) => format!("{}:{}", self.issuer, self.account_name),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::Options;

	#[test]
	fn label() {
		assert_eq!(Options::default().label(), "<unlabelled>");
		assert_eq!(Options::new("Example.com", "").label(), "Example.com");
		assert_eq!(
			Options::new("Example.com", "alice@example.com").label(),
			"Example.com:alice@example.com"
		);
	}
}
