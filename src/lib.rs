// SPDX-License-Identifier: MIT OR Apache-2.0
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod algorithm;
pub mod error;
pub mod hotp;
pub mod ocra;
pub mod options;
pub mod otp;
pub mod secret;
pub mod totp;

pub use algorithm::HashAlgorithm;
pub use error::OtpError;
pub use hotp::{Hotp, HotpConfig};
pub use ocra::{Ocra, OcraConfig, OcraSuite};
pub use options::Options;
pub use otp::Otp;
pub use totp::{Totp, TotpConfig};
