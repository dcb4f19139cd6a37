// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use std::{collections::HashMap, mem};

use super::{BufferContents, BufferId, Device, VertexArrayId};
use crate::{
	draw::{BufferTarget, BufferUsage, DrawCommand},
	layout::VertexInput,
};

/// A device command as seen by `RecordingDevice`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	CreateBuffer {
		buffer: BufferId,
		target: BufferTarget,
		size: usize,
		usage: BufferUsage,
	},
	OrphanBuffer(BufferId),
	WriteBuffer {
		buffer: BufferId,
		offset: usize,
		len: usize,
	},
	DeleteBuffer(BufferId),
	CreateVertexArray {
		vertex_array: VertexArrayId,
		input: VertexInput,
		vertex_buffer: BufferId,
		base_offset: usize,
		index_buffer: Option<BufferId>,
	},
	BindVertexArray(VertexArrayId),
	DeleteVertexArray(VertexArrayId),
	BindVertexInput {
		input: VertexInput,
		buffer: BufferId,
		base_offset: usize,
	},
	Draw(DrawCommand),
}

#[derive(Debug)]
struct RecordedBuffer {
	storage: Vec<u8>,
	// storage replaced by orphaning, oldest first
	retired: Vec<Vec<u8>>,
}

/// Headless device keeping buffer storage in host memory and
/// logging every command it receives.
///
/// Only built for this crate's tests or with the `recording` feature,
/// for downstream tests that want to run writers without a context.
///
/// # PANICS
/// * on writes outside a buffer's storage
/// * on use of deleted or unknown objects
#[derive(Debug, Default)]
pub struct RecordingDevice {
	next_name: u32,
	buffers: HashMap<BufferId, RecordedBuffer>,
	vertex_arrays: HashMap<VertexArrayId, VertexInput>,
	commands: Vec<Command>,
}

impl RecordingDevice {
	pub fn new() -> Self {
		Self::default()
	}

	fn next_name(&mut self) -> u32 {
		self.next_name += 1;
		self.next_name
	}

	fn recorded(&mut self, buffer: BufferId) -> &mut RecordedBuffer {
		self.buffers
			.get_mut(&buffer)
			.unwrap_or_else(|| panic!("buffer {} does not exist", buffer.0))
	}

	pub fn commands(&self) -> &[Command] {
		&self.commands
	}

	/// Drain the command log
	pub fn take_commands(&mut self) -> Vec<Command> {
		mem::take(&mut self.commands)
	}

	/// Draw commands issued so far, in order
	pub fn draws(&self) -> Vec<DrawCommand> {
		self.commands
			.iter()
			.filter_map(|c| match c {
				Command::Draw(draw) => Some(*draw),
				_ => None,
			})
			.collect()
	}

	/// Current storage of `buffer`
	pub fn buffer(&self, buffer: BufferId) -> Option<&[u8]> {
		self.buffers.get(&buffer).map(|b| &b.storage[..])
	}

	/// Storage `buffer` had before its `generation`th orphaning (0-based)
	pub fn retired(&self, buffer: BufferId, generation: usize) -> Option<&[u8]> {
		self.buffers
			.get(&buffer)
			.and_then(|b| b.retired.get(generation))
			.map(|s| &s[..])
	}

	pub fn live_buffers(&self) -> usize {
		self.buffers.len()
	}

	pub fn live_vertex_arrays(&self) -> usize {
		self.vertex_arrays.len()
	}
}

impl Device for RecordingDevice {
	fn create_buffer(
		&mut self,
		target: BufferTarget,
		contents: BufferContents<'_>,
		usage: BufferUsage,
	) -> BufferId {
		let buffer = BufferId(self.next_name());
		let storage = match contents {
			BufferContents::Uninit(size) => vec![0; size],
			BufferContents::Data(data) => data.to_vec(),
		};

		self.commands.push(Command::CreateBuffer {
			buffer,
			target,
			size: storage.len(),
			usage,
		});
		self.buffers.insert(buffer, RecordedBuffer {
			storage,
			retired: Vec::new(),
		});

		buffer
	}

	fn orphan_buffer(&mut self, buffer: BufferId) {
		let recorded = self.recorded(buffer);
		let fresh = vec![0; recorded.storage.len()];
		let old = mem::replace(&mut recorded.storage, fresh);
		recorded.retired.push(old);

		self.commands.push(Command::OrphanBuffer(buffer));
	}

	fn write_buffer(&mut self, buffer: BufferId, offset: usize, data: &[u8]) {
		let recorded = self.recorded(buffer);
		let len = recorded.storage.len();

		match recorded.storage.get_mut(offset..offset + data.len()) {
			Some(range) => range.copy_from_slice(data),
			None => panic!(
				"write of {} bytes at {offset} overflows buffer {} ({len} bytes)",
				data.len(),
				buffer.0
			),
		}

		self.commands.push(Command::WriteBuffer {
			buffer,
			offset,
			len: data.len(),
		});
	}

	fn delete_buffer(&mut self, buffer: BufferId) {
		self.buffers
			.remove(&buffer)
			.unwrap_or_else(|| panic!("buffer {} deleted twice", buffer.0));
		self.commands.push(Command::DeleteBuffer(buffer));
	}

	fn create_vertex_array(
		&mut self,
		input: &VertexInput,
		vertex_buffer: BufferId,
		base_offset: usize,
		index_buffer: Option<BufferId>,
	) -> VertexArrayId {
		self.recorded(vertex_buffer);
		if let Some(index_buffer) = index_buffer {
			self.recorded(index_buffer);
		}

		let vertex_array = VertexArrayId(self.next_name());
		self.vertex_arrays.insert(vertex_array, input.clone());
		self.commands.push(Command::CreateVertexArray {
			vertex_array,
			input: input.clone(),
			vertex_buffer,
			base_offset,
			index_buffer,
		});

		vertex_array
	}

	fn bind_vertex_array(&mut self, vertex_array: VertexArrayId) {
		assert!(
			self.vertex_arrays.contains_key(&vertex_array),
			"vertex array {} does not exist",
			vertex_array.0
		);
		self.commands.push(Command::BindVertexArray(vertex_array));
	}

	fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
		self.vertex_arrays
			.remove(&vertex_array)
			.unwrap_or_else(|| panic!("vertex array {} deleted twice", vertex_array.0));
		self.commands.push(Command::DeleteVertexArray(vertex_array));
	}

	fn bind_vertex_input(&mut self, input: &VertexInput, buffer: BufferId, base_offset: usize) {
		self.recorded(buffer);
		self.commands.push(Command::BindVertexInput {
			input: input.clone(),
			buffer,
			base_offset,
		});
	}

	fn draw(&mut self, command: &DrawCommand) {
		self.commands.push(Command::Draw(*command));
	}
}
