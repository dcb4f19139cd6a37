// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

//! Test to make sure immediate draws survive the stream buffer wrapping.
//!
//! Every triangle is its own draw session and the stream only holds
//! a few frames worth of them, so it is invalidated every few frames.

use gl_immediate::{
	device::{Device, GlDevice, GlDeviceOptions},
	draw::Topology,
	format::Interpretation,
	layout::{AttributeDescriptor, AttributeLayout},
	stream::StreamingAllocator,
	writer::{AttributeWriter, Draw},
	Result,
};
use gl_immediate_tests::{program::Program, FRAGMENT_SHADER, VERTEX_SHADER};
use rand::Rng;

const TRIANGLES: usize = 10;

struct Triangle {
	speed: f32,
	color: [u8; 4],
}

fn draw_triangle(
	device: &mut dyn Device,
	stream: &mut StreamingAllocator,
	layout: &AttributeLayout,
	h: f32,
	v: f32,
	color: [u8; 4],
) -> Result<()> {
	let mut draw = Draw::new(device, stream, layout, Topology::Triangles, 3)?;

	for [x, y] in [[h - 0.1, v], [h + 0.1, v], [h, v + 0.1]] {
		draw.attrib([x, y, 0.0f32, 1.0])?;
		draw.attrib(color)?;
	}

	draw.finalize()?;
	draw.close()
}

fn main() {
	gl_immediate_tests::view_window(true, || {
		let mut device = unsafe { GlDevice::new(GlDeviceOptions::default()) };

		let program = match unsafe { Program::new(VERTEX_SHADER, FRAGMENT_SHADER) } {
			Ok(program) => program,
			Err(e) => panic!("{e}"),
		};

		let layout = AttributeLayout::new([
			AttributeDescriptor::of::<f32>(0, 4, Interpretation::RawValue),
			AttributeDescriptor::of::<u8>(1, 4, Interpretation::NormalizedFloat),
		])
		.unwrap();

		// room for 3 frames of triangles before the stream wraps
		let mut stream =
			StreamingAllocator::new(&mut device, 3 * TRIANGLES * 3 * layout.stride()).unwrap();

		let mut rng = rand::thread_rng();
		let triangles = (0..TRIANGLES)
			.map(|_| Triangle {
				speed: rng.gen_range(0.5..1.5),
				color: [rng.gen(), rng.gen(), rng.gen(), 255],
			})
			.collect::<Vec<_>>();

		let mut anim_t = 0.0;
		let mut last_generation = 0;

		// loop
		move || {
			anim_t += 0.008;

			unsafe {
				gl::ClearColor(0.2, 0.2, 0.2, 1.0);
				gl::Clear(gl::COLOR_BUFFER_BIT);
			}

			program.bind();

			for (i, triangle) in triangles.iter().enumerate() {
				let h = (anim_t * triangle.speed) % 2.0 - 1.0;
				let v = -0.8 + i as f32 * 0.15;

				if let Err(e) = draw_triangle(&mut device, &mut stream, &layout, h, v, triangle.color) {
					log::error!("could not draw triangle {i}: {e}");
				}
			}

			if stream.generation() != last_generation {
				last_generation = stream.generation();
				log::info!("stream wrapped, generation {last_generation}");
			}
		}
	});
}
