// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use std::mem;

use super::{write_value, AttributeWriter, SessionState, VertexCursor};
use crate::{
	device::Device,
	draw::{DrawCommand, Topology},
	error::{ImmediateError, Result},
	format::AttributeValue,
	layout::{AttributeLayout, AttributeSlot},
	stream::{Span, StreamingAllocator},
};

/// Immediate mode draw of a fixed number of vertices.
///
/// The vertex data is reserved from a `StreamingAllocator` up front
/// and drawn by `finalize`. Every session must end in exactly one
/// `finalize` or `cancel`. A session dropped while still open draws
/// nothing and logs an error, `close` turns that case into an `Err`.
///
/// ```no_run
/// # use gl_immediate::{device::*, draw::Topology, format::Interpretation, layout::*, stream::*};
/// # use gl_immediate::writer::{AttributeWriter, Draw};
/// # fn frame(device: &mut GlDevice, stream: &mut StreamingAllocator) -> gl_immediate::Result<()> {
/// let layout = AttributeLayout::new([
/// 	AttributeDescriptor::of::<f32>(0, 4, Interpretation::RawValue),
/// 	AttributeDescriptor::of::<u8>(1, 4, Interpretation::NormalizedFloat),
/// ])?;
///
/// let mut draw = Draw::new(device, stream, &layout, Topology::Triangles, 3)?;
/// draw.attrib([0.0f32, 0.0, 0.0, 1.0])?;
/// draw.attrib([255u8, 0, 0, 255])?;
/// draw.attrib([1.0f32, 0.0, 0.0, 1.0])?;
/// draw.attrib([0u8, 255, 0, 255])?;
/// draw.attrib([0.0f32, 1.0, 0.0, 1.0])?;
/// draw.attrib([0u8, 0, 255, 255])?;
/// draw.finalize()?;
/// # Ok(())
/// # }
/// ```
pub struct Draw<'s> {
	device: &'s mut dyn Device,
	stream: &'s mut StreamingAllocator,
	layout: &'s AttributeLayout,
	topology: Topology,
	vertex_count: usize,
	span: Span,
	vertices: Vec<u8>,
	cursor: VertexCursor,
	state: SessionState,
}

impl<'s> Draw<'s> {
	/// Open a session drawing `vertex_count` vertices of `layout`
	///
	/// # SIDE EFFECTS
	/// * reserves `vertex_count * layout.stride()` bytes from `stream`,
	/// which may orphan its storage
	pub fn new(
		device: &'s mut dyn Device,
		stream: &'s mut StreamingAllocator,
		layout: &'s AttributeLayout,
		topology: Topology,
		vertex_count: usize,
	) -> Result<Self> {
		if !topology.accepts(vertex_count) {
			return Err(ImmediateError::InvalidVertexCount {
				topology,
				count: vertex_count,
			})
		}

		let size = vertex_count.checked_mul(layout.stride()).ok_or(ImmediateError::SpanTooLarge {
			requested: usize::MAX,
			capacity: stream.capacity(),
		})?;

		let span = stream.reserve(device, size)?;
		let vertices = stream.take_scratch(size);

		Ok(Self {
			device,
			stream,
			layout,
			topology,
			vertex_count,
			span,
			vertices,
			cursor: VertexCursor::default(),
			state: SessionState::Open,
		})
	}

	/// Upload the vertices and issue the draw
	pub fn finalize(&mut self) -> Result<DrawCommand> {
		self.ensure_open()?;

		let expected = self.vertex_count * self.layout.attribute_count();
		let written = self.cursor.values_written(self.layout);
		if written != expected {
			return Err(ImmediateError::IncompleteVertexData { written, expected })
		}

		let buffer = self.stream.buffer();
		self.device.write_buffer(buffer, self.span.offset, &self.vertices);
		self.device.bind_vertex_input(&self.layout.vertex_input(), buffer, self.span.offset);

		let command = DrawCommand::arrays(self.topology, 0, self.vertex_count);
		self.device.draw(&command);

		self.end(SessionState::Finalized);

		Ok(command)
	}

	/// Discard the session without drawing.
	///
	/// The reserved span stays unused until the stream wraps.
	pub fn cancel(&mut self) {
		if self.state == SessionState::Open {
			log::debug!("cancelled draw of {} vertices", self.vertex_count);
			self.end(SessionState::Cancelled);
		}
	}

	/// End the session, failing if it was neither finalized nor cancelled
	pub fn close(mut self) -> Result<()> {
		match self.state {
			SessionState::Open => {
				self.end(SessionState::Cancelled);
				Err(ImmediateError::UnclosedSession)
			},
			_ => Ok(()),
		}
	}

	#[inline]
	pub fn state(&self) -> SessionState {
		self.state
	}

	/// The span reserved for this session
	#[inline]
	pub fn span(&self) -> Span {
		self.span
	}

	#[inline]
	pub fn topology(&self) -> Topology {
		self.topology
	}

	#[inline]
	pub fn vertex_count(&self) -> usize {
		self.vertex_count
	}

	fn ensure_open(&self) -> Result<()> {
		match self.state {
			SessionState::Open => Ok(()),
			_ => Err(ImmediateError::AlreadyFinalized),
		}
	}

	fn end(&mut self, state: SessionState) {
		self.state = state;
		self.stream.return_scratch(mem::take(&mut self.vertices));
	}
}

impl AttributeWriter for Draw<'_> {
	fn layout(&self) -> &AttributeLayout {
		self.layout
	}

	fn next_attribute(&self) -> Option<&AttributeSlot> {
		match self.state == SessionState::Open && self.cursor.vertex < self.vertex_count {
			true => self.layout.attribute(self.cursor.attribute),
			false => None,
		}
	}

	fn vertices_written(&self) -> usize {
		self.cursor.vertex
	}

	fn attrib<V: AttributeValue>(&mut self, value: V) -> Result<()> {
		self.ensure_open()?;

		if self.cursor.vertex == self.vertex_count {
			return Err(ImmediateError::TooManyAttributes {
				vertex_count: self.vertex_count,
			})
		}

		let slot = self.cursor.expect::<V>(self.layout)?;
		write_value(&mut self.vertices, self.layout, &mut self.cursor, slot, &value);

		Ok(())
	}
}

impl Drop for Draw<'_> {
	fn drop(&mut self) {
		if self.state == SessionState::Open {
			log::error!(
				"draw of {} vertices dropped without finalize or cancel, nothing was drawn",
				self.vertex_count
			);
			self.end(SessionState::Cancelled);
		}
	}
}
