// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use std::{collections::HashMap, ffi::c_void, marker::PhantomData, ptr};

use gl::types::{GLboolean, GLint, GLintptr, GLsizei, GLsizeiptr, GLuint};

use super::{BufferContents, BufferId, Device, VertexArrayId};
use crate::{
	draw::{BufferTarget, BufferUsage, DrawCommand},
	format::Interpretation,
	layout::VertexInput,
};

/// How `orphan_buffer` detaches storage from in-flight draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Invalidation {
	/// `Invalidate` when the driver supports it, `Orphan` otherwise
	#[default]
	Auto,
	/// `glInvalidateBufferData`
	Invalidate,
	/// `glBufferData` with a null pointer
	Orphan,
}

#[derive(Debug, Clone, Default)]
pub struct GlDeviceOptions {
	pub invalidation: Invalidation,
}

struct BufferInfo {
	size: usize,
	usage: BufferUsage,
}

/// `Device` backed by the current OpenGL 3.3+ core context.
///
/// !Send to ensure buffers are created and deleted
/// on the GL thread
pub struct GlDevice {
	invalidation: Invalidation,
	double_attributes: bool,
	buffers: HashMap<GLuint, BufferInfo>,
	// VAO used for one-off vertex input bindings
	stream_vao: GLuint,
	enabled_attributes: Vec<GLuint>,
	_not_send: PhantomData<*const ()>,
}

impl GlDevice {
	/// # SAFETY
	/// * must be called from GL thread, with the context current
	/// * the context must stay current for every call on the device
	pub unsafe fn new(options: GlDeviceOptions) -> Self {
		let extensions = crate::check_gl_extensions();

		let invalidation = match options.invalidation {
			Invalidation::Auto if extensions.arb_invalidate_subdata => Invalidation::Invalidate,
			Invalidation::Auto => Invalidation::Orphan,
			Invalidation::Invalidate if !gl::InvalidateBufferData::is_loaded() => {
				log::warn!("glInvalidateBufferData is not available, orphaning buffers instead");
				Invalidation::Orphan
			},
			other => other,
		};

		let double_attributes = gl::VertexAttribLPointer::is_loaded();
		if extensions.arb_vertex_attrib_64bit && !double_attributes {
			log::warn!("GL_ARB_vertex_attrib_64bit is advertised but glVertexAttribLPointer did not load");
		}

		log::debug!("using {invalidation:?} buffer invalidation ({extensions:?})");

		let mut stream_vao = 0;
		gl::GenVertexArrays(1, &mut stream_vao);

		Self {
			invalidation,
			double_attributes,
			buffers: HashMap::new(),
			stream_vao,
			enabled_attributes: Vec::new(),
			_not_send: PhantomData,
		}
	}

	pub fn invalidation(&self) -> Invalidation {
		self.invalidation
	}

	/// # SAFETY
	/// * the VAO to configure and the vertex buffer must be bound
	unsafe fn set_vertex_attributes(&self, input: &VertexInput, base_offset: usize) {
		let stride = input.stride as GLsizei;

		for attribute in &input.attributes {
			let descriptor = &attribute.descriptor;
			let index = descriptor.index;
			let pointer = (base_offset + attribute.offset) as *const c_void;
			let count = descriptor.count as GLint;
			let ty = descriptor.storage.gl_type();

			match descriptor.interpretation {
				Interpretation::IntegerAsIs => {
					gl::VertexAttribIPointer(index, count, ty, stride, pointer);
				},
				Interpretation::Double => {
					if !self.double_attributes {
						log::error!("attribute {index} needs glVertexAttribLPointer, which is not available");
						continue
					}
					gl::VertexAttribLPointer(index, count, ty, stride, pointer);
				},
				Interpretation::RawValue | Interpretation::NormalizedFloat => {
					let normalized = matches!(
						descriptor.interpretation,
						Interpretation::NormalizedFloat
					) as GLboolean;
					gl::VertexAttribPointer(index, count, ty, normalized, stride, pointer);
				},
			}

			gl::EnableVertexAttribArray(index);
		}
	}

	/// Bind `buffer` somewhere that does not disturb vertex array state
	unsafe fn bind_for_copy(buffer: BufferId) {
		gl::BindBuffer(gl::COPY_WRITE_BUFFER, buffer.0);
	}
}

impl Device for GlDevice {
	fn create_buffer(
		&mut self,
		target: BufferTarget,
		contents: BufferContents<'_>,
		usage: BufferUsage,
	) -> BufferId {
		let size = contents.len();
		let data = match contents {
			BufferContents::Uninit(_) => ptr::null(),
			BufferContents::Data(data) => data.as_ptr() as *const c_void,
		};

		let mut buffer = 0;
		unsafe {
			gl::GenBuffers(1, &mut buffer);
			Self::bind_for_copy(BufferId(buffer));
			gl::BufferData(gl::COPY_WRITE_BUFFER, size as GLsizeiptr, data, usage.gl_usage());
		}

		log::debug!("created {target:?} buffer {buffer} ({size} bytes, {usage:?})");
		self.buffers.insert(buffer, BufferInfo { size, usage });

		BufferId(buffer)
	}

	fn orphan_buffer(&mut self, buffer: BufferId) {
		let Some(info) = self.buffers.get(&buffer.0) else {
			log::error!("tried to orphan unknown buffer {}", buffer.0);
			return
		};

		unsafe {
			match self.invalidation {
				Invalidation::Invalidate => gl::InvalidateBufferData(buffer.0),
				_ => {
					Self::bind_for_copy(buffer);
					gl::BufferData(
						gl::COPY_WRITE_BUFFER,
						info.size as GLsizeiptr,
						ptr::null(),
						info.usage.gl_usage(),
					);
				},
			}
		}
	}

	fn write_buffer(&mut self, buffer: BufferId, offset: usize, data: &[u8]) {
		if data.is_empty() {
			return
		}

		unsafe {
			Self::bind_for_copy(buffer);

			let mapped = gl::MapBufferRange(
				gl::COPY_WRITE_BUFFER,
				offset as GLintptr,
				data.len() as GLsizeiptr,
				gl::MAP_WRITE_BIT | gl::MAP_UNSYNCHRONIZED_BIT | gl::MAP_INVALIDATE_RANGE_BIT,
			) as *mut u8;

			if mapped.is_null() {
				log::warn!("could not map buffer {}, falling back to glBufferSubData", buffer.0);
			} else {
				ptr::copy_nonoverlapping(data.as_ptr(), mapped, data.len());

				if gl::UnmapBuffer(gl::COPY_WRITE_BUFFER) == gl::TRUE {
					return
				}

				// the mapping was corrupted (e.g. video mode switch), contents are undefined
				log::warn!("lost mapping of buffer {}, rewriting with glBufferSubData", buffer.0);
			}

			gl::BufferSubData(
				gl::COPY_WRITE_BUFFER,
				offset as GLintptr,
				data.len() as GLsizeiptr,
				data.as_ptr() as *const c_void,
			);
		}
	}

	fn delete_buffer(&mut self, buffer: BufferId) {
		self.buffers.remove(&buffer.0);
		unsafe { gl::DeleteBuffers(1, &buffer.0) };
	}

	fn create_vertex_array(
		&mut self,
		input: &VertexInput,
		vertex_buffer: BufferId,
		base_offset: usize,
		index_buffer: Option<BufferId>,
	) -> VertexArrayId {
		let mut vao = 0;

		unsafe {
			gl::GenVertexArrays(1, &mut vao);
			gl::BindVertexArray(vao);
			gl::BindBuffer(gl::ARRAY_BUFFER, vertex_buffer.0);

			self.set_vertex_attributes(input, base_offset);

			if let Some(index_buffer) = index_buffer {
				gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, index_buffer.0);
			}

			gl::BindVertexArray(0);
		}

		VertexArrayId(vao)
	}

	fn bind_vertex_array(&mut self, vertex_array: VertexArrayId) {
		unsafe { gl::BindVertexArray(vertex_array.0) };
	}

	fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
		unsafe { gl::DeleteVertexArrays(1, &vertex_array.0) };
	}

	fn bind_vertex_input(&mut self, input: &VertexInput, buffer: BufferId, base_offset: usize) {
		unsafe {
			gl::BindVertexArray(self.stream_vao);
			gl::BindBuffer(gl::ARRAY_BUFFER, buffer.0);

			for index in self.enabled_attributes.drain(..) {
				if !input.indices().any(|i| i == index) {
					gl::DisableVertexAttribArray(index);
				}
			}

			self.set_vertex_attributes(input, base_offset);
		}

		self.enabled_attributes.extend(input.indices());
	}

	fn draw(&mut self, command: &DrawCommand) {
		log::trace!("draw {command:?}");

		unsafe {
			match *command {
				DrawCommand::Arrays {
					topology,
					first,
					count,
				} => gl::DrawArrays(topology.gl_mode(), first as GLint, count as GLsizei),
				DrawCommand::Elements {
					topology,
					count,
					index_type,
					offset,
					base_vertex,
					restart_index,
				} => {
					if let Some(restart_index) = restart_index {
						gl::Enable(gl::PRIMITIVE_RESTART);
						gl::PrimitiveRestartIndex(restart_index);
					}

					let indices = offset as *const c_void;
					match base_vertex {
						Some(base_vertex) => gl::DrawElementsBaseVertex(
							topology.gl_mode(),
							count as GLsizei,
							index_type.gl_type(),
							indices,
							base_vertex,
						),
						None => gl::DrawElements(
							topology.gl_mode(),
							count as GLsizei,
							index_type.gl_type(),
							indices,
						),
					}

					if restart_index.is_some() {
						gl::Disable(gl::PRIMITIVE_RESTART);
					}
				},
			}
		}
	}
}

impl Drop for GlDevice {
	fn drop(&mut self) {
		if !self.buffers.is_empty() {
			log::warn!("{} buffers were never deleted", self.buffers.len());
		}

		unsafe { gl::DeleteVertexArrays(1, &self.stream_vao) };
	}
}
