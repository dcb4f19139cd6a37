// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use gl::types::GLenum;

/// Primitive topology of a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
	Points,
	Lines,
	LineStrip,
	LineLoop,
	Triangles,
	TriangleStrip,
	TriangleFan,
	LinesAdjacency,
	LineStripAdjacency,
	TrianglesAdjacency,
	TriangleStripAdjacency,
}

impl Topology {
	#[inline]
	pub const fn gl_mode(self) -> GLenum {
		match self {
			Self::Points => gl::POINTS,
			Self::Lines => gl::LINES,
			Self::LineStrip => gl::LINE_STRIP,
			Self::LineLoop => gl::LINE_LOOP,
			Self::Triangles => gl::TRIANGLES,
			Self::TriangleStrip => gl::TRIANGLE_STRIP,
			Self::TriangleFan => gl::TRIANGLE_FAN,
			Self::LinesAdjacency => gl::LINES_ADJACENCY,
			Self::LineStripAdjacency => gl::LINE_STRIP_ADJACENCY,
			Self::TrianglesAdjacency => gl::TRIANGLES_ADJACENCY,
			Self::TriangleStripAdjacency => gl::TRIANGLE_STRIP_ADJACENCY,
		}
	}

	/// Check that `count` vertices form whole primitives
	pub const fn accepts(self, count: usize) -> bool {
		if count == 0 {
			return false
		}

		match self {
			Self::Points => true,
			Self::Lines => count % 2 == 0,
			Self::LineStrip | Self::LineLoop => count >= 2,
			Self::Triangles => count % 3 == 0,
			Self::TriangleStrip | Self::TriangleFan => count >= 3,
			Self::LinesAdjacency => count % 4 == 0,
			Self::LineStripAdjacency => count >= 4,
			Self::TrianglesAdjacency => count % 6 == 0,
			Self::TriangleStripAdjacency => count >= 6 && count % 2 == 0,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
	U8,
	U16,
	U32,
}

impl IndexType {
	#[inline]
	pub const fn size(self) -> usize {
		match self {
			Self::U8 => 1,
			Self::U16 => 2,
			Self::U32 => 4,
		}
	}

	#[inline]
	pub const fn gl_type(self) -> GLenum {
		match self {
			Self::U8 => gl::UNSIGNED_BYTE,
			Self::U16 => gl::UNSIGNED_SHORT,
			Self::U32 => gl::UNSIGNED_INT,
		}
	}
}

/// Unsigned integers usable as element indices
pub trait GlIndex: bytemuck::Pod {
	const INDEX_TYPE: IndexType;
}

impl GlIndex for u8 {
	const INDEX_TYPE: IndexType = IndexType::U8;
}

impl GlIndex for u16 {
	const INDEX_TYPE: IndexType = IndexType::U16;
}

impl GlIndex for u32 {
	const INDEX_TYPE: IndexType = IndexType::U32;
}

/// One replayable draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
	Arrays {
		topology: Topology,
		first: usize,
		count: usize,
	},
	Elements {
		topology: Topology,
		count: usize,
		index_type: IndexType,
		/// Byte offset into the index buffer
		offset: usize,
		base_vertex: Option<i32>,
		restart_index: Option<u32>,
	},
}

impl DrawCommand {
	pub const fn arrays(topology: Topology, first: usize, count: usize) -> Self {
		Self::Arrays {
			topology,
			first,
			count,
		}
	}

	pub const fn elements<I: GlIndex>(topology: Topology, first: usize, count: usize) -> Self {
		Self::Elements {
			topology,
			count,
			index_type: I::INDEX_TYPE,
			offset: first * I::INDEX_TYPE.size(),
			base_vertex: None,
			restart_index: None,
		}
	}

	/// Offset every index by `base_vertex`, ignored for array draws
	pub fn with_base_vertex(self, base_vertex: i32) -> Self {
		match self {
			Self::Elements {
				topology,
				count,
				index_type,
				offset,
				restart_index,
				..
			} => Self::Elements {
				topology,
				count,
				index_type,
				offset,
				base_vertex: Some(base_vertex),
				restart_index,
			},
			arrays => arrays,
		}
	}

	/// Restart primitives at `index`, ignored for array draws
	pub fn with_restart_index(self, index: u32) -> Self {
		match self {
			Self::Elements {
				topology,
				count,
				index_type,
				offset,
				base_vertex,
				..
			} => Self::Elements {
				topology,
				count,
				index_type,
				offset,
				base_vertex,
				restart_index: Some(index),
			},
			arrays => arrays,
		}
	}

	#[inline]
	pub const fn topology(&self) -> Topology {
		match self {
			Self::Arrays { topology, .. } | Self::Elements { topology, .. } => *topology,
		}
	}

	#[inline]
	pub const fn is_indexed(&self) -> bool {
		matches!(self, Self::Elements { .. })
	}
}

/// Buffer usage hints. Drivers are free to ignore them.
///
/// * Static - set once, used often
/// * Dynamic - set and used frequently
/// * Stream - set once, used at most a few times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
	StaticDraw,
	DynamicDraw,
	StreamDraw,
	StaticRead,
	DynamicRead,
	StreamRead,
	StaticCopy,
	DynamicCopy,
	StreamCopy,
}

impl BufferUsage {
	pub const fn gl_usage(self) -> GLenum {
		match self {
			Self::StaticDraw => gl::STATIC_DRAW,
			Self::DynamicDraw => gl::DYNAMIC_DRAW,
			Self::StreamDraw => gl::STREAM_DRAW,
			Self::StaticRead => gl::STATIC_READ,
			Self::DynamicRead => gl::DYNAMIC_READ,
			Self::StreamRead => gl::STREAM_READ,
			Self::StaticCopy => gl::STATIC_COPY,
			Self::DynamicCopy => gl::DYNAMIC_COPY,
			Self::StreamCopy => gl::STREAM_COPY,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
	Vertex,
	Index,
}

impl BufferTarget {
	pub const fn gl_target(self) -> GLenum {
		match self {
			Self::Vertex => gl::ARRAY_BUFFER,
			Self::Index => gl::ELEMENT_ARRAY_BUFFER,
		}
	}
}
