// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use crate::{
	error::{ImmediateError, Result},
	format::AttributeValue,
	layout::{AttributeLayout, AttributeSlot},
};

pub mod cpu;
pub mod immediate;

#[cfg(test)]
mod test;

pub use self::{cpu::CpuDataWriter, immediate::Draw};

/// Sink for interleaved attribute values.
///
/// Values must arrive in layout order, one attribute at a time,
/// vertex after vertex. Mesh generators write through this trait
/// so they work with either writer.
pub trait AttributeWriter {
	fn layout(&self) -> &AttributeLayout;
	/// The attribute the next value is checked against,
	/// `None` when the writer accepts no more values
	fn next_attribute(&self) -> Option<&AttributeSlot>;
	/// Number of complete vertices written
	fn vertices_written(&self) -> usize;
	fn attrib<V: AttributeValue>(&mut self, value: V) -> Result<()>;
}

/// Lifecycle of a writer session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	Open,
	Finalized,
	Cancelled,
}

/// Position of the next value inside a run of interleaved vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct VertexCursor {
	pub vertex: usize,
	pub attribute: usize,
}

impl VertexCursor {
	/// Check `V` against the attribute at the cursor
	pub fn expect<'l, V: AttributeValue>(
		&self,
		layout: &'l AttributeLayout,
	) -> Result<&'l AttributeSlot> {
		let slot = &layout.attributes()[self.attribute];
		let descriptor = &slot.descriptor;

		if !descriptor.accepts::<V>() {
			return Err(ImmediateError::TypeMismatch {
				index: descriptor.index,
				expected_count: descriptor.count,
				expected_type: descriptor.storage,
				got_count: V::COMPONENTS,
				got_type: V::STORAGE,
			})
		}

		Ok(slot)
	}

	/// Byte offset of the value at the cursor
	#[inline]
	pub fn byte_offset(&self, layout: &AttributeLayout, slot: &AttributeSlot) -> usize {
		self.vertex * layout.stride() + slot.offset
	}

	#[inline]
	pub fn advance(&mut self, layout: &AttributeLayout) {
		self.attribute += 1;
		if self.attribute == layout.attribute_count() {
			self.attribute = 0;
			self.vertex += 1;
		}
	}

	#[inline]
	pub fn values_written(&self, layout: &AttributeLayout) -> usize {
		self.vertex * layout.attribute_count() + self.attribute
	}
}

/// Copy `value` into `vertices` at the cursor and advance it
pub(crate) fn write_value<V: AttributeValue>(
	vertices: &mut [u8],
	layout: &AttributeLayout,
	cursor: &mut VertexCursor,
	slot: &AttributeSlot,
	value: &V,
) {
	let offset = cursor.byte_offset(layout, slot);
	vertices[offset..offset + slot.size()].copy_from_slice(value.bytes());
	cursor.advance(layout);
}
