use super::{Span, StreamingAllocator};
use crate::{
	device::{record::Command, Device, RecordingDevice},
	error::ImmediateError,
};

#[test]
fn test_reserve_within_capacity() {
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 100).unwrap();

	let spans = [10, 30, 60]
		.into_iter()
		.map(|size| stream.reserve(&mut device, size).unwrap())
		.collect::<Vec<_>>();

	assert_eq!(spans, vec![
		Span {
			offset: 0,
			size: 10,
			generation: 0
		},
		Span {
			offset: 10,
			size: 30,
			generation: 0
		},
		Span {
			offset: 40,
			size: 60,
			generation: 0
		},
	]);
	assert_eq!(stream.generation(), 0);
	assert_eq!(stream.remaining(), 0);
	assert!(!device.commands().iter().any(|c| matches!(c, Command::OrphanBuffer(_))));
}

#[test]
fn test_reserve_wraps_with_invalidation() {
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 100).unwrap();

	stream.reserve(&mut device, 70).unwrap();
	let span = stream.reserve(&mut device, 40).unwrap();

	assert_eq!(span, Span {
		offset: 0,
		size: 40,
		generation: 1
	});
	assert_eq!(stream.generation(), 1);
	assert_eq!(stream.cursor(), 40);
	assert_eq!(
		device
			.commands()
			.iter()
			.filter(|c| **c == Command::OrphanBuffer(stream.buffer()))
			.count(),
		1
	);

	// every overflow invalidates, even right after a wrap
	let span = stream.reserve(&mut device, 61).unwrap();
	assert_eq!(span.offset, 0);
	assert_eq!(span.generation, 2);
}

#[test]
fn test_reserve_exact_fit_does_not_wrap() {
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 64).unwrap();

	stream.reserve(&mut device, 60).unwrap();
	let span = stream.reserve(&mut device, 4).unwrap();

	assert_eq!(span.offset, 60);
	assert_eq!(span.generation, 0);
}

#[test]
fn test_span_too_large() {
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 64).unwrap();
	stream.reserve(&mut device, 16).unwrap();

	assert_eq!(
		stream.reserve(&mut device, 65),
		Err(ImmediateError::SpanTooLarge {
			requested: 65,
			capacity: 64
		})
	);

	// a failed reservation leaves the stream untouched
	assert_eq!(stream.cursor(), 16);
	assert_eq!(stream.generation(), 0);
}

#[test]
fn test_zero_capacity() {
	let mut device = RecordingDevice::new();
	assert_eq!(
		StreamingAllocator::new(&mut device, 0).unwrap_err(),
		ImmediateError::InvalidCapacity
	);
	assert_eq!(device.live_buffers(), 0);
}

#[test]
fn test_orphaned_storage_is_preserved() {
	let mut device = RecordingDevice::new();
	let mut stream = StreamingAllocator::new(&mut device, 8).unwrap();
	let buffer = stream.buffer();

	let span = stream.reserve(&mut device, 8).unwrap();
	device.write_buffer(buffer, span.offset, &[7; 8]);

	let span = stream.reserve(&mut device, 4).unwrap();
	assert_eq!(span.generation, 1);

	// the old generation is still intact for whoever was reading it
	assert_eq!(device.retired(buffer, 0), Some(&[7u8; 8][..]));
	assert_eq!(device.buffer(buffer), Some(&[0u8; 8][..]));
}

#[test]
fn test_release() {
	let mut device = RecordingDevice::new();
	let stream = StreamingAllocator::new(&mut device, 8).unwrap();
	assert_eq!(device.live_buffers(), 1);

	stream.release(&mut device);
	assert_eq!(device.live_buffers(), 0);
}
