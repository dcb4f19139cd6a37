use std::sync::Arc;

use half::f16;

use super::{AttributeWriter, CpuDataWriter, Draw, SessionState};
use crate::{
	device::{record::Command, Device, RecordingDevice},
	draw::{BufferUsage, DrawCommand, Topology},
	error::ImmediateError,
	format::{Fixed, Interpretation, StorageType},
	layout::{AttributeDescriptor, AttributeLayout},
	stream::StreamingAllocator,
};

fn position_color() -> AttributeLayout {
	AttributeLayout::new([
		AttributeDescriptor::of::<f32>(0, 4, Interpretation::RawValue),
		AttributeDescriptor::of::<u8>(1, 4, Interpretation::NormalizedFloat),
	])
	.unwrap()
}

fn write_triangle(writer: &mut impl AttributeWriter) {
	for i in 0..3u8 {
		let f = i as f32;
		writer.attrib([f, f + 0.5, 0.0f32, 1.0]).unwrap();
		writer.attrib([i, 10 * i, 20 * i, 255u8]).unwrap();
	}
}

#[test]
fn test_triangle_draw() {
	let layout = position_color();
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 1024).unwrap();

	let mut draw = Draw::new(&mut device, &mut stream, &layout, Topology::Triangles, 3).unwrap();
	assert_eq!(draw.span().size, 60);
	write_triangle(&mut draw);

	assert_eq!(draw.vertices_written(), 3);
	assert_eq!(draw.next_attribute(), None);
	assert_eq!(
		draw.attrib([9.0f32, 9.0, 9.0, 9.0]),
		Err(ImmediateError::TooManyAttributes { vertex_count: 3 })
	);

	let command = draw.finalize().unwrap();
	assert_eq!(command, DrawCommand::arrays(Topology::Triangles, 0, 3));
	assert_eq!(draw.state(), SessionState::Finalized);
	draw.close().unwrap();

	assert_eq!(device.draws(), vec![command]);

	let buffer = stream.buffer();
	let bound = device.commands().iter().any(|c| {
		*c == Command::BindVertexInput {
			input: layout.vertex_input(),
			buffer,
			base_offset: 0,
		}
	});
	assert!(bound);
}

#[test]
fn test_values_land_at_layout_offsets() {
	let layout = position_color();
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 1024).unwrap();

	// move the cursor so the session does not start at 0
	stream.reserve(&mut device, 12).unwrap();

	let mut draw = Draw::new(&mut device, &mut stream, &layout, Topology::Triangles, 3).unwrap();
	let base = draw.span().offset;
	assert_eq!(base, 12);
	write_triangle(&mut draw);
	draw.finalize().unwrap();
	drop(draw);

	let storage = device.buffer(stream.buffer()).unwrap();
	let stride = layout.stride();

	for v in 0..3usize {
		let f = v as f32;
		let position = base + v * stride + layout.attributes()[0].offset;
		let color = base + v * stride + layout.attributes()[1].offset;

		assert_eq!(
			&storage[position..position + 16],
			bytemuck::cast_slice::<f32, u8>(&[f, f + 0.5, 0.0, 1.0])
		);
		let i = v as u8;
		assert_eq!(&storage[color..color + 4], &[i, 10 * i, 20 * i, 255]);
	}
}

#[test]
fn test_finalize_incomplete() {
	let layout = position_color();
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 1024).unwrap();

	let mut draw = Draw::new(&mut device, &mut stream, &layout, Topology::Triangles, 3).unwrap();
	draw.attrib([0.0f32; 4]).unwrap();
	draw.attrib([0u8; 4]).unwrap();
	draw.attrib([0.0f32; 4]).unwrap();

	assert_eq!(
		draw.finalize(),
		Err(ImmediateError::IncompleteVertexData {
			written: 3,
			expected: 6
		})
	);

	// still open, the remaining values can be supplied
	assert_eq!(draw.state(), SessionState::Open);
	draw.attrib([0u8; 4]).unwrap();
	draw.attrib([0.0f32; 4]).unwrap();
	draw.attrib([0u8; 4]).unwrap();
	draw.finalize().unwrap();
	drop(draw);

	assert_eq!(device.draws().len(), 1);
}

#[test]
fn test_finalize_twice() {
	let layout = position_color();
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 1024).unwrap();

	let mut draw = Draw::new(&mut device, &mut stream, &layout, Topology::Triangles, 3).unwrap();
	write_triangle(&mut draw);
	draw.finalize().unwrap();

	assert_eq!(draw.finalize(), Err(ImmediateError::AlreadyFinalized));
	assert_eq!(draw.attrib([0.0f32; 4]), Err(ImmediateError::AlreadyFinalized));
	drop(draw);

	assert_eq!(device.draws().len(), 1);
}

#[test]
fn test_type_mismatch() {
	let layout = position_color();
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 1024).unwrap();

	let mut draw = Draw::new(&mut device, &mut stream, &layout, Topology::Points, 1).unwrap();

	// no widening from double to float
	assert_eq!(
		draw.attrib([0.0f64; 4]),
		Err(ImmediateError::TypeMismatch {
			index: 0,
			expected_count: 4,
			expected_type: StorageType::F32,
			got_count: 4,
			got_type: StorageType::F64,
		})
	);
	assert_eq!(
		draw.attrib([0.0f32; 3]),
		Err(ImmediateError::TypeMismatch {
			index: 0,
			expected_count: 4,
			expected_type: StorageType::F32,
			got_count: 3,
			got_type: StorageType::F32,
		})
	);

	// rejected values leave the cursor where it was
	assert_eq!(draw.next_attribute().map(|a| a.index()), Some(0));
	draw.attrib([0.0f32; 4]).unwrap();
	assert_eq!(draw.next_attribute().map(|a| a.index()), Some(1));

	assert!(matches!(
		draw.attrib([0u16; 4]),
		Err(ImmediateError::TypeMismatch { index: 1, .. })
	));
	draw.attrib([0u8; 4]).unwrap();
	draw.finalize().unwrap();
}

#[test]
fn test_cancel_and_close() {
	let layout = position_color();
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 1024).unwrap();

	let mut draw = Draw::new(&mut device, &mut stream, &layout, Topology::Triangles, 3).unwrap();
	draw.attrib([0.0f32; 4]).unwrap();
	draw.cancel();
	draw.cancel();

	assert_eq!(draw.state(), SessionState::Cancelled);
	assert_eq!(draw.finalize(), Err(ImmediateError::AlreadyFinalized));
	draw.close().unwrap();

	let draw = Draw::new(&mut device, &mut stream, &layout, Topology::Triangles, 3).unwrap();
	assert_eq!(draw.close(), Err(ImmediateError::UnclosedSession));

	let draw = Draw::new(&mut device, &mut stream, &layout, Topology::Triangles, 3).unwrap();
	drop(draw);

	// cancelled and abandoned sessions still consumed their spans
	assert_eq!(stream.cursor(), 180);
	assert!(device.draws().is_empty());
}

#[test]
fn test_invalid_vertex_count() {
	let layout = position_color();
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 1024).unwrap();

	let cases = [
		(Topology::Triangles, 4),
		(Topology::Lines, 3),
		(Topology::TriangleStrip, 2),
		(Topology::Points, 0),
		(Topology::TrianglesAdjacency, 3),
	];

	for (topology, count) in cases {
		assert_eq!(
			Draw::new(&mut device, &mut stream, &layout, topology, count).err(),
			Some(ImmediateError::InvalidVertexCount { topology, count })
		);
	}

	// nothing was reserved for the rejected sessions
	assert_eq!(stream.cursor(), 0);
}

#[test]
fn test_draw_larger_than_stream() {
	let layout = position_color();
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 100).unwrap();

	assert_eq!(
		Draw::new(&mut device, &mut stream, &layout, Topology::Triangles, 6).err(),
		Some(ImmediateError::SpanTooLarge {
			requested: 120,
			capacity: 100
		})
	);
}

#[test]
fn test_sessions_wrap_stream() {
	let layout = position_color();
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 100).unwrap();
	let buffer = stream.buffer();

	let mut draw = Draw::new(&mut device, &mut stream, &layout, Topology::Triangles, 3).unwrap();
	write_triangle(&mut draw);
	draw.finalize().unwrap();
	drop(draw);

	let first = device.buffer(buffer).unwrap()[..60].to_vec();

	let mut draw = Draw::new(&mut device, &mut stream, &layout, Topology::Triangles, 3).unwrap();
	let span = draw.span();
	for _ in 0..3 {
		draw.attrib([-1.0f32; 4]).unwrap();
		draw.attrib([1u8; 4]).unwrap();
	}
	draw.finalize().unwrap();
	drop(draw);

	// the second triangle did not fit behind the first one
	assert_eq!(span.offset, 0);
	assert_eq!(span.generation, 1);
	assert_eq!(&device.retired(buffer, 0).unwrap()[..60], &first[..]);
	assert_eq!(&device.buffer(buffer).unwrap()[16..20], &[1, 1, 1, 1]);
	assert_eq!(device.draws().len(), 2);
}

#[test]
fn test_mixed_storage_types() {
	let layout = AttributeLayout::new([
		AttributeDescriptor::of::<f16>(0, 2, Interpretation::RawValue),
		AttributeDescriptor::of::<Fixed>(1, 1, Interpretation::RawValue),
		AttributeDescriptor::of::<i16>(2, 3, Interpretation::NormalizedFloat),
		AttributeDescriptor::of::<u32>(3, 1, Interpretation::IntegerAsIs),
		AttributeDescriptor::of::<f64>(4, 1, Interpretation::Double),
	])
	.unwrap();
	assert_eq!(layout.stride(), 4 + 4 + 6 + 4 + 8);

	let mut writer = CpuDataWriter::new(Arc::new(layout), 1);
	writer.attrib([f16::from_f32(1.0), f16::from_f32(-2.0)]).unwrap();
	writer.attrib(Fixed::from_f32(1.5)).unwrap();
	writer.attrib([-1i16, 0, i16::MAX]).unwrap();
	writer.attrib(7u32).unwrap();
	writer.attrib(0.25f64).unwrap();

	let bytes = writer.bytes();
	assert_eq!(bytes.len(), 26);
	assert_eq!(&bytes[0..2], &f16::from_f32(1.0).to_ne_bytes()[..]);
	assert_eq!(&bytes[4..8], &(0x18000i32).to_ne_bytes()[..]);
	assert_eq!(&bytes[14..18], &7u32.to_ne_bytes()[..]);
	assert_eq!(&bytes[18..26], &0.25f64.to_ne_bytes()[..]);
}

#[test]
fn test_cpu_writer_grows_past_hint() {
	let layout = Arc::new(position_color());
	let mut writer = CpuDataWriter::new(layout.clone(), 2);

	for i in 0..5u8 {
		writer.attrib([i as f32; 4]).unwrap();
		writer.attrib([i; 4]).unwrap();
	}
	assert_eq!(writer.vertices_written(), 5);
	assert_eq!(writer.bytes().len(), 5 * 20);

	let mut device = RecordingDevice::new();
	let buffer = writer.transfer_to_device(&mut device, BufferUsage::StaticDraw).unwrap();

	let storage = device.buffer(buffer).unwrap();
	assert_eq!(storage.len(), 100);
	assert_eq!(&storage[4 * 20 + 16..4 * 20 + 20], &[4, 4, 4, 4]);
}

#[test]
fn test_cpu_writer_transfer_errors() {
	let layout = Arc::new(position_color());
	let mut device = RecordingDevice::new();
	let mut writer = CpuDataWriter::new(layout, 4);

	assert_eq!(
		writer.transfer_to_device(&mut device, BufferUsage::StaticDraw),
		Err(ImmediateError::EmptyWriter)
	);

	writer.attrib([0.0f32; 4]).unwrap();
	writer.attrib([0u8; 4]).unwrap();
	writer.attrib([0.0f32; 4]).unwrap();
	assert!(!writer.is_complete());
	assert_eq!(writer.bytes().len(), 20);

	assert_eq!(
		writer.transfer_to_device(&mut device, BufferUsage::StaticDraw),
		Err(ImmediateError::IncompleteVertexData {
			written: 3,
			expected: 4
		})
	);
	assert_eq!(device.live_buffers(), 0);

	writer.clear();
	assert_eq!(writer.vertices_written(), 0);
	assert_eq!(writer.next_attribute().map(|a| a.index()), Some(0));
}

#[test]
fn test_cpu_writer_upload_into() {
	let layout = Arc::new(position_color());
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 64).unwrap();

	let mut writer = CpuDataWriter::new(layout, 1);
	writer.attrib([2.0f32; 4]).unwrap();
	writer.attrib([9u8; 4]).unwrap();

	let span = stream.reserve(&mut device, writer.bytes().len()).unwrap();
	writer.upload_into(&mut device, stream.buffer(), span.offset).unwrap();

	assert_eq!(&device.buffer(stream.buffer()).unwrap()[..20], writer.bytes());

	device.orphan_buffer(stream.buffer());
	assert_eq!(&device.buffer(stream.buffer()).unwrap()[..20], &[0u8; 20]);
}

#[test]
fn test_cpu_writer_inert_after_transfer() {
	let layout = Arc::new(position_color());
	let mut device = RecordingDevice::new();
	let mut writer = CpuDataWriter::new(layout, 1);
	writer.attrib([1.0f32; 4]).unwrap();
	writer.attrib([1u8; 4]).unwrap();

	let buffer = writer.transfer_to_device(&mut device, BufferUsage::StaticDraw).unwrap();
	assert_eq!(writer.state(), SessionState::Finalized);
	assert_eq!(writer.next_attribute(), None);

	assert_eq!(writer.attrib([2.0f32; 4]), Err(ImmediateError::AlreadyFinalized));
	assert_eq!(writer.attrib([2u8; 4]), Err(ImmediateError::AlreadyFinalized));
	assert_eq!(
		writer.transfer_to_device(&mut device, BufferUsage::StaticDraw),
		Err(ImmediateError::AlreadyFinalized)
	);
	assert_eq!(
		writer.upload_into(&mut device, buffer, 0),
		Err(ImmediateError::AlreadyFinalized)
	);
	assert_eq!(writer.finalize(), Err(ImmediateError::AlreadyFinalized));

	assert_eq!(device.live_buffers(), 1);
	assert_eq!(writer.vertices_written(), 1);
	assert_eq!(device.buffer(buffer).unwrap(), writer.bytes());

	// clear starts a new session
	writer.clear();
	assert_eq!(writer.state(), SessionState::Open);
	writer.attrib([3.0f32; 4]).unwrap();
	writer.attrib([3u8; 4]).unwrap();
	writer.upload_into(&mut device, buffer, 0).unwrap();
	assert_eq!(&device.buffer(buffer).unwrap()[16..20], &[3, 3, 3, 3]);
}

#[test]
fn test_cpu_writer_finalize() {
	let layout = Arc::new(position_color());
	let mut writer = CpuDataWriter::new(layout, 2);

	assert_eq!(writer.finalize(), Err(ImmediateError::EmptyWriter));
	writer.attrib([1.0f32; 4]).unwrap();
	assert_eq!(
		writer.finalize(),
		Err(ImmediateError::IncompleteVertexData {
			written: 1,
			expected: 2
		})
	);
	assert_eq!(writer.state(), SessionState::Open);

	writer.attrib([1u8; 4]).unwrap();
	writer.finalize().unwrap();
	assert_eq!(writer.bytes().len(), 20);
	assert_eq!(writer.attrib([1.0f32; 4]), Err(ImmediateError::AlreadyFinalized));
}

#[test]
fn test_cpu_writer_huge_hint() {
	let layout = Arc::new(position_color());

	for hint in [usize::MAX / 8, usize::MAX / 20, usize::MAX] {
		let mut writer = CpuDataWriter::new(layout.clone(), hint);
		writer.attrib([0.5f32; 4]).unwrap();
		writer.attrib([7u8; 4]).unwrap();

		assert_eq!(writer.vertices_written(), 1);
		assert_eq!(&writer.bytes()[16..20], &[7, 7, 7, 7]);
	}
}
