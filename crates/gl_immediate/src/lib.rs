// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

//! Immediate mode vertex submission on top of buffer objects.
//!
//! Vertices are described by an `AttributeLayout`, written one attribute
//! at a time through an `AttributeWriter` and either drawn right away
//! from a `StreamingAllocator` (`writer::Draw`) or staged for a static
//! `mesh::Mesh` (`writer::CpuDataWriter`).

use std::ffi::{c_char, CStr};

pub mod device;
pub mod draw;
pub mod error;
pub mod format;
pub mod layout;
pub mod mesh;
pub mod stream;
pub mod writer;

pub use error::{ImmediateError, Result};

#[derive(Debug)]
pub struct GlExtensions {
	pub arb_invalidate_subdata: bool,
	pub arb_vertex_attrib_64bit: bool,
}

/// Query the extensions of the current context.
/// Expects a current context with its functions loaded.
pub fn check_gl_extensions() -> GlExtensions {
	let mut extension_count = 0;
	unsafe { gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut extension_count) };

	let extensions = (0..extension_count.max(0) as u32)
		.filter_map(|i| {
			let name = unsafe { gl::GetStringi(gl::EXTENSIONS, i) };
			if name.is_null() {
				return None
			}

			match unsafe { CStr::from_ptr(name as *const c_char) }.to_str() {
				Ok(name) => Some(name),
				Err(_) => {
					log::warn!("skipping non UTF8 extension name at index {i}");
					None
				},
			}
		})
		.collect::<Vec<_>>();

	GlExtensions {
		arb_invalidate_subdata: extensions.contains(&"GL_ARB_invalidate_subdata"),
		arb_vertex_attrib_64bit: extensions.contains(&"GL_ARB_vertex_attrib_64bit"),
	}
}
