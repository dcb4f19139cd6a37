// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

//! Test to make sure meshes render through each of their variants.
//!
//! A fan of colored hexagons is staged on the CPU once, then drawn
//! alternating between the full layout and a position only variant
//! (which falls back to the constant black color attribute).

use std::{f32::consts::TAU, sync::Arc};

use gl_immediate::{
	device::{GlDevice, GlDeviceOptions},
	draw::{BufferUsage, DrawCommand, Topology},
	format::Interpretation,
	layout::{AttributeDescriptor, AttributeLayout},
	mesh::{Mesh, MeshBuilder},
	writer::{AttributeWriter, CpuDataWriter},
	Result,
};
use gl_immediate_tests::{program::Program, FRAGMENT_SHADER, VERTEX_SHADER};
use rand::Rng;

const HEXAGONS: usize = 6;
// center + 6 corners
const HEXAGON_VERTICES: usize = 7;

fn hexagon_mesh(device: &mut GlDevice) -> Result<Mesh> {
	let layout = Arc::new(AttributeLayout::new([
		AttributeDescriptor::of::<f32>(0, 2, Interpretation::RawValue),
		AttributeDescriptor::of::<u8>(1, 4, Interpretation::NormalizedFloat),
	])?);

	let mut writer = CpuDataWriter::new(layout, HEXAGONS * HEXAGON_VERTICES);
	let mut rng = rand::thread_rng();

	for i in 0..HEXAGONS {
		let center = [-0.75 + i as f32 * 0.3, rng.gen_range(-0.5..0.5)];
		let color = [rng.gen(), rng.gen(), rng.gen(), 255u8];

		writer.attrib(center)?;
		writer.attrib([255u8, 255, 255, 255])?;

		for corner in 0..6 {
			let angle = corner as f32 / 6.0 * TAU;
			writer.attrib([center[0] + angle.cos() * 0.12, center[1] + angle.sin() * 0.12])?;
			writer.attrib(color)?;
		}
	}

	// every hexagon reuses the same indices, offset by base vertex
	let indices: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 1];

	let mut builder = MeshBuilder::from_writer(&mut writer)?
		.indices(&indices)
		.primary_name("colored")
		.variant("position-only", &[0]);

	for i in 0..HEXAGONS {
		builder = builder.command(
			DrawCommand::elements::<u8>(Topology::TriangleFan, 0, indices.len())
				.with_base_vertex((i * HEXAGON_VERTICES) as i32),
		);
	}

	builder.build(device, BufferUsage::StaticDraw)
}

fn main() {
	gl_immediate_tests::view_window(true, || {
		let mut device = unsafe { GlDevice::new(GlDeviceOptions::default()) };

		let program = match unsafe { Program::new(VERTEX_SHADER, FRAGMENT_SHADER) } {
			Ok(program) => program,
			Err(e) => panic!("{e}"),
		};

		let mesh = match hexagon_mesh(&mut device) {
			Ok(mesh) => mesh,
			Err(e) => panic!("could not build mesh: {e}"),
		};

		log::info!("mesh variants: {:?}", mesh.variant_names().collect::<Vec<_>>());

		let mut frame = 0u32;

		// loop
		move || {
			frame += 1;
			let variant = match (frame / 60) % 2 {
				0 => "colored",
				_ => "position-only",
			};

			unsafe {
				gl::ClearColor(0.2, 0.2, 0.2, 1.0);
				gl::Clear(gl::COLOR_BUFFER_BIT);
			}

			program.bind();

			if let Err(e) = mesh.render(&mut device, Some(variant)) {
				log::error!("could not render {variant}: {e}");
			}
		}
	});
}
