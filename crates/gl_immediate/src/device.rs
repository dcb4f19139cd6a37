// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use gl::types::GLuint;

use crate::{
	draw::{BufferTarget, BufferUsage, DrawCommand},
	layout::VertexInput,
};

pub mod gl_device;
#[cfg(any(test, feature = "recording"))]
pub mod record;

pub use self::gl_device::{GlDevice, GlDeviceOptions, Invalidation};
#[cfg(any(test, feature = "recording"))]
pub use self::record::RecordingDevice;

/// Device buffer object name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub GLuint);

/// Device vertex array object name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub GLuint);

/// Initial contents of a new buffer
#[derive(Debug, Clone, Copy)]
pub enum BufferContents<'a> {
	/// Storage of the given size with undefined contents
	Uninit(usize),
	Data(&'a [u8]),
}

impl BufferContents<'_> {
	#[inline]
	pub fn len(&self) -> usize {
		match self {
			Self::Uninit(size) => *size,
			Self::Data(data) => data.len(),
		}
	}
}

/// The graphics device as seen by the core.
///
/// Device and driver failures are not reported through this trait,
/// implementations surface them through their own channels
/// (GL debug output for `GlDevice`).
pub trait Device {
	fn create_buffer(
		&mut self,
		target: BufferTarget,
		contents: BufferContents<'_>,
		usage: BufferUsage,
	) -> BufferId;
	/// Give `buffer` fresh storage of the same size and usage.
	///
	/// Draws already issued keep reading the old storage until
	/// they complete, the caller never waits for them.
	fn orphan_buffer(&mut self, buffer: BufferId);
	/// Write `data` at `offset` without synchronizing with the device.
	///
	/// The caller guarantees no issued draw reads the range.
	fn write_buffer(&mut self, buffer: BufferId, offset: usize, data: &[u8]);
	fn delete_buffer(&mut self, buffer: BufferId);
	/// Record a bindable configuration reading `vertex_buffer` from `base_offset`
	fn create_vertex_array(
		&mut self,
		input: &VertexInput,
		vertex_buffer: BufferId,
		base_offset: usize,
		index_buffer: Option<BufferId>,
	) -> VertexArrayId;
	fn bind_vertex_array(&mut self, vertex_array: VertexArrayId);
	fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);
	/// Configure vertex input for a one-off draw reading `buffer` from `base_offset`
	fn bind_vertex_input(&mut self, input: &VertexInput, buffer: BufferId, base_offset: usize);
	/// Draw with whatever configuration was bound last
	fn draw(&mut self, command: &DrawCommand);
}
