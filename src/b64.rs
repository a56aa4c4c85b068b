//! This module contains basic base64 functionality as used in Hawk.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;

/// BEWIT_ENGINE encodes to a url-safe value with padding, and decodes with or without it.
pub(crate) const BEWIT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// STANDARD_ENGINE encodes with the standard alphabet and includes padding.
pub(crate) const STANDARD_ENGINE: GeneralPurpose = base64::engine::general_purpose::STANDARD;
