// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use crate::{
	device::{BufferContents, BufferId, Device},
	draw::{BufferTarget, BufferUsage},
	error::{ImmediateError, Result},
};

#[cfg(test)]
mod test;

/// Byte range granted by `StreamingAllocator::reserve`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
	pub offset: usize,
	pub size: usize,
	/// Storage generation the span lives in
	pub generation: u64,
}

/// Append-only ring over one fixed size vertex buffer.
///
/// Spans are handed out front to back. When a request does not fit
/// behind the cursor, the whole buffer is orphaned and the request is
/// served from offset 0 of the fresh storage. Spans are never reused in
/// place, so the allocator never has to wait on (or track) draws still
/// reading older spans.
///
/// Writers borrow the allocator mutably for their whole session, so only
/// one session can be open against it at a time:
///
/// ```compile_fail
/// use gl_immediate::{
/// 	device::Device,
/// 	draw::Topology,
/// 	layout::AttributeLayout,
/// 	stream::StreamingAllocator,
/// 	writer::Draw,
/// };
///
/// fn two_sessions(
/// 	device: &mut dyn Device,
/// 	stream: &mut StreamingAllocator,
/// 	layout: &AttributeLayout,
/// ) {
/// 	let first = Draw::new(device, stream, layout, Topology::Points, 1);
/// 	let second = Draw::new(device, stream, layout, Topology::Points, 1);
/// 	drop((first, second));
/// }
/// ```
#[derive(Debug)]
pub struct StreamingAllocator {
	buffer: BufferId,
	capacity: usize,
	cursor: usize,
	generation: u64,
	// staging memory lent to the open session
	scratch: Vec<u8>,
}

impl StreamingAllocator {
	/// Allocate a `capacity` byte stream buffer
	pub fn new(device: &mut dyn Device, capacity: usize) -> Result<Self> {
		if capacity == 0 {
			return Err(ImmediateError::InvalidCapacity)
		}

		let buffer = device.create_buffer(
			BufferTarget::Vertex,
			BufferContents::Uninit(capacity),
			BufferUsage::StreamDraw,
		);

		Ok(Self {
			buffer,
			capacity,
			cursor: 0,
			generation: 0,
			scratch: Vec::new(),
		})
	}

	/// Reserve `size` bytes for a single write.
	///
	/// # SIDE EFFECTS
	/// * orphans the backing storage if `size` does not fit behind the cursor
	pub fn reserve(&mut self, device: &mut dyn Device, size: usize) -> Result<Span> {
		if size > self.capacity {
			return Err(ImmediateError::SpanTooLarge {
				requested: size,
				capacity: self.capacity,
			})
		}

		if size > self.remaining() {
			self.invalidate(device);
		}

		let span = Span {
			offset: self.cursor,
			size,
			generation: self.generation,
		};
		self.cursor += size;

		log::trace!("reserved {span:?} in stream buffer {}", self.buffer.0);

		Ok(span)
	}

	/// Orphan the backing storage and restart at offset 0
	pub fn invalidate(&mut self, device: &mut dyn Device) {
		device.orphan_buffer(self.buffer);
		self.cursor = 0;
		self.generation += 1;

		log::debug!(
			"stream buffer {} invalidated, now at generation {}",
			self.buffer.0,
			self.generation
		);
	}

	/// Lend out zeroed staging memory for `size` bytes
	pub(crate) fn take_scratch(&mut self, size: usize) -> Vec<u8> {
		let mut scratch = std::mem::take(&mut self.scratch);
		scratch.clear();
		scratch.resize(size, 0);
		scratch
	}

	pub(crate) fn return_scratch(&mut self, scratch: Vec<u8>) {
		if scratch.capacity() > self.scratch.capacity() {
			self.scratch = scratch;
		}
	}

	/// Delete the backing buffer
	pub fn release(self, device: &mut dyn Device) {
		device.delete_buffer(self.buffer);
	}

	#[inline]
	pub fn buffer(&self) -> BufferId {
		self.buffer
	}

	#[inline]
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	#[inline]
	pub fn cursor(&self) -> usize {
		self.cursor
	}

	#[inline]
	pub fn remaining(&self) -> usize {
		self.capacity - self.cursor
	}

	/// Number of invalidations so far
	#[inline]
	pub fn generation(&self) -> u64 {
		self.generation
	}
}
