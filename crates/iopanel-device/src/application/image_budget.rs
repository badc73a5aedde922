//! Keeps encoded images small enough for one datagram.

use iopanel_core::domain::controls::RawImage;
use tracing::debug;

use super::collaborators::ImageCodec;

/// Largest encoded image carried in a reply, in bytes.
pub const IMAGE_BUDGET: usize = 60_000;

/// Encodes `image`, halving its size until the encoding fits the budget.
///
/// Gives up shrinking at 1×1 and returns whatever that encodes to.  Returns
/// `None` only if the codec itself fails.
pub fn encode_within_budget(codec: &dyn ImageCodec, image: &RawImage) -> Option<Vec<u8>> {
    encode_with_limit(codec, image, IMAGE_BUDGET)
}

fn encode_with_limit(codec: &dyn ImageCodec, image: &RawImage, limit: usize) -> Option<Vec<u8>> {
    let mut encoded = codec.encode(image)?;
    let mut current = image.clone();
    while encoded.len() > limit && (current.width > 1 || current.height > 1) {
        current = current.downscale_half();
        debug!(
            width = current.width,
            height = current.height,
            size = encoded.len(),
            "image over budget, downscaling"
        );
        encoded = codec.encode(&current)?;
    }
    Some(encoded)
}
