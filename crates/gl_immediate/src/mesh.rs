// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use std::{collections::HashMap, sync::Arc};

use crate::{
	device::{BufferContents, BufferId, Device, VertexArrayId},
	draw::{BufferTarget, BufferUsage, DrawCommand, GlIndex},
	error::{ImmediateError, Result},
	layout::{AttributeLayout, VertexInput},
	writer::CpuDataWriter,
};


enum VertexSource {
	Data(Vec<u8>),
	Buffer(BufferId),
}

/// Collects everything a `Mesh` is built from.
///
/// Nothing touches the device until `build`.
pub struct MeshBuilder {
	layout: Arc<AttributeLayout>,
	vertices: VertexSource,
	indices: Option<Vec<u8>>,
	commands: Vec<DrawCommand>,
	primary: Option<Vec<u32>>,
	primary_name: Option<String>,
	variants: HashMap<String, Vec<u32>>,
}

/// Static geometry with a replayable draw command list, rendered
/// through its primary attribute configuration or a named variant.
pub struct Mesh {
	layout: Arc<AttributeLayout>,
	buffers: Vec<BufferId>,
	primary: VertexArrayId,
	primary_name: Option<String>,
	variants: HashMap<String, VertexArrayId>,
	commands: Vec<DrawCommand>,
}

impl MeshBuilder {
	/// Build from the vertices staged in `writer`, finalizing it
	pub fn from_writer(writer: &mut CpuDataWriter) -> Result<Self> {
		let layout = writer.shared_layout().clone();
		let data = writer.finish()?.to_vec();
		Ok(Self::new(layout, VertexSource::Data(data)))
	}

	/// Build around an existing vertex buffer laid out as `layout`.
	///
	/// The mesh takes ownership of the buffer.
	pub fn from_buffer(layout: Arc<AttributeLayout>, buffer: BufferId) -> Self {
		Self::new(layout, VertexSource::Buffer(buffer))
	}

	fn new(layout: Arc<AttributeLayout>, vertices: VertexSource) -> Self {
		Self {
			layout,
			vertices,
			indices: None,
			commands: Vec::new(),
			primary: None,
			primary_name: None,
			variants: HashMap::new(),
		}
	}

	pub fn indices<I: GlIndex>(mut self, indices: &[I]) -> Self {
		self.indices = Some(bytemuck::cast_slice(indices).to_vec());
		self
	}

	pub fn command(mut self, command: DrawCommand) -> Self {
		self.commands.push(command);
		self
	}

	/// Restrict the primary configuration to `indices`,
	/// it binds every attribute otherwise
	pub fn primary(mut self, indices: &[u32]) -> Self {
		self.primary = Some(indices.to_vec());
		self
	}

	/// Make the primary configuration reachable by `name` as well
	pub fn primary_name(mut self, name: impl Into<String>) -> Self {
		let name = name.into();
		self.variants.remove(&name);
		self.primary_name = Some(name);
		self
	}

	/// Add a named configuration binding only `indices`.
	/// Reusing a name replaces the earlier configuration.
	pub fn variant(mut self, name: impl Into<String>, indices: &[u32]) -> Self {
		let name = name.into();
		if self.primary_name.as_ref() == Some(&name) {
			self.primary_name = None;
		}
		self.variants.insert(name, indices.to_vec());
		self
	}

	/// Upload staged data and create the vertex arrays.
	///
	/// All validation happens before any device object is created.
	pub fn build(self, device: &mut dyn Device, usage: BufferUsage) -> Result<Mesh> {
		let primary = match &self.primary {
			Some(indices) => self.layout.vertex_input_for(indices)?,
			None => self.layout.vertex_input(),
		};

		let variants = self
			.variants
			.iter()
			.map(|(name, indices)| Ok((name.clone(), self.layout.vertex_input_for(indices)?)))
			.collect::<Result<Vec<(String, VertexInput)>>>()?;

		if self.indices.is_none() && self.commands.iter().any(DrawCommand::is_indexed) {
			return Err(ImmediateError::MissingIndexBuffer)
		}

		let vertex_buffer = match &self.vertices {
			VertexSource::Data(data) =>
				device.create_buffer(BufferTarget::Vertex, BufferContents::Data(data), usage),
			VertexSource::Buffer(buffer) => *buffer,
		};
		let index_buffer = self.indices.as_ref().map(|indices| {
			device.create_buffer(BufferTarget::Index, BufferContents::Data(indices), usage)
		});

		let mut buffers = vec![vertex_buffer];
		buffers.extend(index_buffer);

		let primary = device.create_vertex_array(&primary, vertex_buffer, 0, index_buffer);
		let variants = variants
			.into_iter()
			.map(|(name, input)| {
				let vertex_array = device.create_vertex_array(&input, vertex_buffer, 0, index_buffer);
				(name, vertex_array)
			})
			.collect::<HashMap<_, _>>();

		log::debug!(
			"built mesh with {} draw commands and {} variants",
			self.commands.len(),
			variants.len()
		);

		Ok(Mesh {
			layout: self.layout,
			buffers,
			primary,
			primary_name: self.primary_name,
			variants,
			commands: self.commands,
		})
	}
}

impl Mesh {
	/// Bind the selected configuration and replay the draw commands.
	///
	/// `None` selects the primary configuration.
	pub fn render(&self, device: &mut dyn Device, variant: Option<&str>) -> Result<()> {
		let vertex_array = self.vertex_array(variant)?;

		device.bind_vertex_array(vertex_array);
		for command in &self.commands {
			device.draw(command);
		}

		Ok(())
	}

	pub fn vertex_array(&self, variant: Option<&str>) -> Result<VertexArrayId> {
		match variant {
			None => Ok(self.primary),
			Some(name) if self.primary_name.as_deref() == Some(name) => Ok(self.primary),
			Some(name) => self
				.variants
				.get(name)
				.copied()
				.ok_or_else(|| ImmediateError::UnknownVariant(name.to_owned())),
		}
	}

	pub fn variant_names(&self) -> impl Iterator<Item = &str> {
		self.variants.keys().map(String::as_str)
	}

	pub fn commands(&self) -> &[DrawCommand] {
		&self.commands
	}

	pub fn layout(&self) -> &AttributeLayout {
		&self.layout
	}

	/// Delete the vertex arrays and buffers owned by the mesh
	pub fn release(self, device: &mut dyn Device) {
		device.delete_vertex_array(self.primary);
		for vertex_array in self.variants.into_values() {
			device.delete_vertex_array(vertex_array);
		}
		for buffer in self.buffers {
			device.delete_buffer(buffer);
		}
	}
}
