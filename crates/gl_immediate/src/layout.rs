// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use crate::{
	error::{DescriptorProblem, ImmediateError, Result},
	format::{AttributeValue, GLtype, Interpretation, StorageType},
};


/// One per-vertex attribute, as declared by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeDescriptor {
	/// Binding slot, `layout(location = index)` in glsl
	pub index: u32,
	pub count: usize,
	pub storage: StorageType,
	pub interpretation: Interpretation,
}

impl AttributeDescriptor {
	pub const fn new(
		index: u32,
		count: usize,
		storage: StorageType,
		interpretation: Interpretation,
	) -> Self {
		Self {
			index,
			count,
			storage,
			interpretation,
		}
	}

	pub const fn of<T: GLtype>(index: u32, count: usize, interpretation: Interpretation) -> Self {
		Self::new(index, count, T::STORAGE, interpretation)
	}

	/// Size of one attribute value in bytes
	#[inline]
	pub const fn size(&self) -> usize {
		self.count * self.storage.size()
	}

	#[inline]
	pub fn accepts<V: AttributeValue>(&self) -> bool {
		V::STORAGE == self.storage && V::COMPONENTS == self.count
	}

	fn validate(&self) -> Result<()> {
		if !(1..=4).contains(&self.count) {
			return Err(ImmediateError::InvalidDescriptor(DescriptorProblem::ComponentCount {
				index: self.index,
				count: self.count,
			}))
		}

		if !self.interpretation.supports(self.storage) {
			return Err(ImmediateError::InvalidDescriptor(DescriptorProblem::Unsupported {
				index: self.index,
				storage: self.storage,
				interpretation: self.interpretation,
			}))
		}

		Ok(())
	}
}

/// An attribute placed inside the interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSlot {
	pub descriptor: AttributeDescriptor,
	/// Byte offset from the start of the vertex
	pub offset: usize,
}

impl AttributeSlot {
	#[inline]
	pub const fn size(&self) -> usize {
		self.descriptor.size()
	}

	#[inline]
	pub const fn index(&self) -> u32 {
		self.descriptor.index
	}
}

/// Compiled, tightly packed interleaved vertex layout.
///
/// The order of the descriptors is the order in which writers
/// expect attribute values for each vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeLayout {
	slots: Vec<AttributeSlot>,
	stride: usize,
}

/// Attribute bindings for the vertex input assembler,
/// covering all or part of a layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexInput {
	pub stride: usize,
	pub attributes: Vec<AttributeSlot>,
}

impl AttributeLayout {
	pub fn new(descriptors: impl IntoIterator<Item = AttributeDescriptor>) -> Result<Self> {
		let mut slots = Vec::<AttributeSlot>::new();
		let mut offset = 0;

		for descriptor in descriptors {
			descriptor.validate()?;

			if slots.iter().any(|s| s.index() == descriptor.index) {
				return Err(ImmediateError::InvalidDescriptor(DescriptorProblem::DuplicateIndex(
					descriptor.index,
				)))
			}

			if offset % 4 != 0 {
				log::warn!(
					"attribute {} starts at unaligned offset {offset}, some drivers will fall back to slow paths",
					descriptor.index
				);
			}

			slots.push(AttributeSlot { descriptor, offset });
			offset += descriptor.size();
		}

		if slots.is_empty() {
			return Err(ImmediateError::InvalidDescriptor(DescriptorProblem::Empty))
		}

		Ok(Self {
			slots,
			stride: offset,
		})
	}

	/// Size of one vertex in bytes
	#[inline]
	pub fn stride(&self) -> usize {
		self.stride
	}

	#[inline]
	pub fn attribute_count(&self) -> usize {
		self.slots.len()
	}

	/// Attributes in submission order
	#[inline]
	pub fn attributes(&self) -> &[AttributeSlot] {
		&self.slots
	}

	/// The `position`th attribute in submission order
	#[inline]
	pub fn attribute(&self, position: usize) -> Option<&AttributeSlot> {
		self.slots.get(position)
	}

	/// Find an attribute by binding index
	pub fn find(&self, index: u32) -> Option<&AttributeSlot> {
		self.slots.iter().find(|s| s.index() == index)
	}

	/// Bind description for every attribute in the layout
	pub fn vertex_input(&self) -> VertexInput {
		VertexInput {
			stride: self.stride,
			attributes: self.slots.clone(),
		}
	}

	/// Bind description for a subset of the layout's attributes.
	///
	/// The stride stays the full vertex stride, so the subset reads
	/// from the same interleaved buffer.
	pub fn vertex_input_for(&self, indices: &[u32]) -> Result<VertexInput> {
		let attributes = indices
			.iter()
			.map(|&index| self.find(index).copied().ok_or(ImmediateError::UnknownAttribute(index)))
			.collect::<Result<Vec<_>>>()?;

		Ok(VertexInput {
			stride: self.stride,
			attributes,
		})
	}
}

impl VertexInput {
	pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
		self.attributes.iter().map(|a| a.index())
	}
}
