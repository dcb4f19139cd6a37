// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use std::sync::Arc;

use super::{write_value, AttributeWriter, SessionState, VertexCursor};
use crate::{
	device::{BufferContents, BufferId, Device},
	draw::{BufferTarget, BufferUsage},
	error::{ImmediateError, Result},
	format::AttributeValue,
	layout::{AttributeLayout, AttributeSlot},
};

/// Stages interleaved vertices in host memory for a later upload.
///
/// Unlike `Draw` there is no vertex limit, storage grows as needed.
/// The session ends with its transfer: `finalize` (or the first
/// successful `transfer_to_device` / `upload_into`) makes it inert
/// until `clear` starts a new one.
#[derive(Debug, Clone)]
pub struct CpuDataWriter {
	layout: Arc<AttributeLayout>,
	vertices: Vec<u8>,
	cursor: VertexCursor,
	vertex_count_hint: usize,
	state: SessionState,
}

impl CpuDataWriter {
	/// `vertex_count_hint` only sizes the initial allocation,
	/// a hint too large to allocate is ignored
	pub fn new(layout: Arc<AttributeLayout>, vertex_count_hint: usize) -> Self {
		let mut vertices = Vec::new();
		let reserved = vertex_count_hint
			.checked_mul(layout.stride())
			.map(|size| vertices.try_reserve_exact(size).is_ok());

		if reserved != Some(true) {
			log::debug!("not preallocating for a hint of {vertex_count_hint} vertices");
		}

		Self {
			layout,
			vertices,
			cursor: VertexCursor::default(),
			vertex_count_hint,
			state: SessionState::Open,
		}
	}

	/// Shared handle to the layout
	pub fn shared_layout(&self) -> &Arc<AttributeLayout> {
		&self.layout
	}

	/// Bytes of all complete vertices
	pub fn bytes(&self) -> &[u8] {
		&self.vertices[..self.cursor.vertex * self.layout.stride()]
	}

	/// Check that no vertex is partially written
	pub fn is_complete(&self) -> bool {
		self.cursor.attribute == 0
	}

	#[inline]
	pub fn state(&self) -> SessionState {
		self.state
	}

	/// Drop all vertices and reopen the session, keeping the allocation
	pub fn clear(&mut self) {
		self.vertices.clear();
		self.cursor = VertexCursor::default();
		self.state = SessionState::Open;
	}

	/// End the session without transferring.
	/// The staged bytes stay readable through `bytes`.
	pub fn finalize(&mut self) -> Result<()> {
		self.finish().map(|_| ())
	}

	/// Finalize and copy the vertices into a new buffer of exactly
	/// `vertices_written() * stride` bytes
	pub fn transfer_to_device(
		&mut self,
		device: &mut dyn Device,
		usage: BufferUsage,
	) -> Result<BufferId> {
		let data = self.finish()?;
		Ok(device.create_buffer(BufferTarget::Vertex, BufferContents::Data(data), usage))
	}

	/// Finalize and copy the vertices into an existing buffer at `offset`
	pub fn upload_into(
		&mut self,
		device: &mut dyn Device,
		buffer: BufferId,
		offset: usize,
	) -> Result<()> {
		let data = self.finish()?;
		device.write_buffer(buffer, offset, data);
		Ok(())
	}

	/// Check the session can end, then end it.
	/// A failed check leaves the session open.
	pub(crate) fn finish(&mut self) -> Result<&[u8]> {
		if self.state != SessionState::Open {
			return Err(ImmediateError::AlreadyFinalized)
		}

		if !self.is_complete() {
			return Err(ImmediateError::IncompleteVertexData {
				written: self.cursor.values_written(&self.layout),
				expected: (self.cursor.vertex + 1) * self.layout.attribute_count(),
			})
		}

		if self.cursor.vertex == 0 {
			return Err(ImmediateError::EmptyWriter)
		}

		self.state = SessionState::Finalized;
		Ok(self.bytes())
	}
}

impl AttributeWriter for CpuDataWriter {
	fn layout(&self) -> &AttributeLayout {
		&self.layout
	}

	fn next_attribute(&self) -> Option<&AttributeSlot> {
		match self.state {
			SessionState::Open => self.layout.attribute(self.cursor.attribute),
			_ => None,
		}
	}

	fn vertices_written(&self) -> usize {
		self.cursor.vertex
	}

	fn attrib<V: AttributeValue>(&mut self, value: V) -> Result<()> {
		if self.state != SessionState::Open {
			return Err(ImmediateError::AlreadyFinalized)
		}

		let layout = &*self.layout;
		let slot = self.cursor.expect::<V>(layout)?;

		if self.cursor.attribute == 0 {
			if self.cursor.vertex == self.vertex_count_hint {
				log::debug!(
					"writer outgrew its hint of {} vertices",
					self.vertex_count_hint
				);
			}

			let end = self.vertices.len() + layout.stride();
			self.vertices.resize(end, 0);
		}

		write_value(&mut self.vertices, layout, &mut self.cursor, slot, &value);

		Ok(())
	}
}
