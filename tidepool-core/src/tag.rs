use anchor_lang::prelude::*;

/// Caller-opaque 32-byte correlation tag. Recorded verbatim in settlement
/// records and never interpreted; uniqueness is the caller's responsibility.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, AnchorSerialize, AnchorDeserialize,
)]
pub struct Tag(pub [u8; 32]);

impl Tag {
  /// Builds a tag from an ASCII reference, zero-padded on the left the way
  /// off-chain payment references are usually widened to 32 bytes.
  /// Input longer than 32 bytes is truncated to its first 32.
  #[must_use]
  pub fn from_ascii(reference: &str) -> Tag {
    let bytes = reference.as_bytes();
    let len = bytes.len().min(32);
    let mut tag = [0u8; 32];
    tag[32 - len..].copy_from_slice(&bytes[..len]);
    Tag(tag)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ascii_is_left_padded() {
    let tag = Tag::from_ascii("BVQ0AQ3PC98SHFSSO9NG");
    assert_eq!(&tag.0[..12], &[0u8; 12]);
    assert_eq!(&tag.0[12..], b"BVQ0AQ3PC98SHFSSO9NG");
  }

  #[test]
  fn long_reference_truncates() {
    let tag = Tag::from_ascii("0123456789012345678901234567890123456789");
    assert_eq!(&tag.0, b"01234567890123456789012345678901");
  }
}
