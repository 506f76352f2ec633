use std::ops::Deref;

/// A host byte buffer
///
/// Cloning shares the underlying allocation, so decoding a buffer into a
/// native value does not copy it.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Bytes(pub(crate) bytes::Bytes);

impl Bytes {
	/// Create new bytes from Vec<u8>
	pub fn new(data: Vec<u8>) -> Self {
		Self(data.into())
	}

	/// Copy a slice into a freshly allocated buffer of exact length
	pub fn copy_from_slice(data: &[u8]) -> Self {
		Self(bytes::Bytes::copy_from_slice(data))
	}

	/// Get the inner buffer
	pub fn inner(&self) -> &bytes::Bytes {
		&self.0
	}

	/// Convert the buffer to a Vec<u8>
	pub fn into_vec(self) -> Vec<u8> {
		self.0.into()
	}
}

impl From<Vec<u8>> for Bytes {
	fn from(v: Vec<u8>) -> Self {
		Self(v.into())
	}
}

impl From<&[u8]> for Bytes {
	fn from(v: &[u8]) -> Self {
		Self::copy_from_slice(v)
	}
}

impl From<bytes::Bytes> for Bytes {
	fn from(v: bytes::Bytes) -> Self {
		Self(v)
	}
}

impl From<Bytes> for Vec<u8> {
	fn from(v: Bytes) -> Self {
		v.into_vec()
	}
}

impl Deref for Bytes {
	type Target = [u8];

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
