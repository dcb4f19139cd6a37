// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use gl::types::GLenum;
use half::f16;
use seq_macro::seq;

/// How a single component is laid out in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
	I8,
	U8,
	I16,
	U16,
	I32,
	U32,
	F16,
	F32,
	F64,
	/// 16.16 signed fixed point
	Fixed,
}

/// How the vertex shader sees the stored components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpretation {
	/// Converted to float without normalization.
	RawValue,
	/// Integer storage mapped to `[0, 1]` or `[-1, 1]`.
	NormalizedFloat,
	/// Integer storage read by an integer shader input.
	IntegerAsIs,
	/// `F64` storage read by a double shader input.
	Double,
}

impl StorageType {
	#[inline]
	pub const fn size(self) -> usize {
		match self {
			Self::I8 | Self::U8 => 1,
			Self::I16 | Self::U16 | Self::F16 => 2,
			Self::I32 | Self::U32 | Self::F32 | Self::Fixed => 4,
			Self::F64 => 8,
		}
	}

	#[inline]
	pub const fn is_integer(self) -> bool {
		matches!(self, Self::I8 | Self::U8 | Self::I16 | Self::U16 | Self::I32 | Self::U32)
	}

	#[inline]
	pub const fn gl_type(self) -> GLenum {
		match self {
			Self::I8 => gl::BYTE,
			Self::U8 => gl::UNSIGNED_BYTE,
			Self::I16 => gl::SHORT,
			Self::U16 => gl::UNSIGNED_SHORT,
			Self::I32 => gl::INT,
			Self::U32 => gl::UNSIGNED_INT,
			Self::F16 => gl::HALF_FLOAT,
			Self::F32 => gl::FLOAT,
			Self::F64 => gl::DOUBLE,
			Self::Fixed => gl::FIXED,
		}
	}
}

impl Interpretation {
	pub const fn supports(self, storage: StorageType) -> bool {
		match self {
			Self::RawValue => true,
			Self::NormalizedFloat | Self::IntegerAsIs => storage.is_integer(),
			Self::Double => matches!(storage, StorageType::F64),
		}
	}
}

/// 16.16 fixed point value, stored as `GL_FIXED`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(transparent)]
pub struct Fixed(pub i32);

impl Fixed {
	pub fn from_f32(value: f32) -> Self {
		Self((value * 65536.0).round() as i32)
	}

	pub fn to_f32(self) -> f32 {
		self.0 as f32 / 65536.0
	}
}

/// Scalar types that map onto a `StorageType`
pub trait GLtype: bytemuck::Pod {
	const STORAGE: StorageType;
}

/// A value for one attribute of one vertex.
///
/// The storage type and component count must match the
/// expected attribute exactly, nothing is widened or converted.
pub trait AttributeValue {
	const STORAGE: StorageType;
	const COMPONENTS: usize;

	fn bytes(&self) -> &[u8];
}

macro_rules! gl_types {
	($($type:ty => $storage:ident;)*) => {
		$(
			impl GLtype for $type {
				const STORAGE: StorageType = StorageType::$storage;
			}

			impl AttributeValue for $type {
				const STORAGE: StorageType = StorageType::$storage;
				const COMPONENTS: usize = 1;

				#[inline(always)]
				fn bytes(&self) -> &[u8] {
					bytemuck::bytes_of(self)
				}
			}
		)*
	}
}

gl_types! {
	f64 => F64;
	f32 => F32;
	f16 => F16;
	Fixed => Fixed;

	u32 => U32;
	u16 => U16;
	u8 => U8;

	i32 => I32;
	i16 => I16;
	i8 => I8;
}

seq!(N in 1..=4 {
	impl<T: GLtype> AttributeValue for [T; N] {
		const STORAGE: StorageType = T::STORAGE;
		const COMPONENTS: usize = N;

		#[inline(always)]
		fn bytes(&self) -> &[u8] {
			bytemuck::cast_slice(self.as_slice())
		}
	}
});
