// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use std::{
	ffi::{c_char, c_void, CStr},
	ptr, slice,
};

use gl::types::{GLenum, GLsizei, GLuint};
use log::Level;


const TARGET: &str = "OpenGL";

/// Forward GL debug output to `log` under the `OpenGL` target.
///
/// Notifications are only requested from the driver while
/// trace logging is enabled for the target.
pub fn setup_gl_debug() {
	unsafe {
		gl::Enable(gl::DEBUG_OUTPUT);
		gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
		gl::DebugMessageCallback(Some(forward_message), ptr::null());
		gl::DebugMessageControl(gl::DONT_CARE, gl::DONT_CARE, gl::DONT_CARE, 0, ptr::null(), gl::TRUE);

		if !log::log_enabled!(target: TARGET, Level::Trace) {
			gl::DebugMessageControl(
				gl::DONT_CARE,
				gl::DONT_CARE,
				gl::DEBUG_SEVERITY_NOTIFICATION,
				0,
				ptr::null(),
				gl::FALSE,
			);
		}
	}
}

pub fn severity_level(severity: GLenum) -> Level {
	match severity {
		gl::DEBUG_SEVERITY_HIGH => Level::Error,
		gl::DEBUG_SEVERITY_MEDIUM => Level::Warn,
		gl::DEBUG_SEVERITY_LOW => Level::Debug,
		_ => Level::Trace,
	}
}

pub fn source_name(source: GLenum) -> &'static str {
	match source {
		gl::DEBUG_SOURCE_API => "api",
		gl::DEBUG_SOURCE_WINDOW_SYSTEM => "window system",
		gl::DEBUG_SOURCE_SHADER_COMPILER => "shader compiler",
		gl::DEBUG_SOURCE_THIRD_PARTY => "third party",
		gl::DEBUG_SOURCE_APPLICATION => "application",
		_ => "other",
	}
}

pub fn type_name(ty: GLenum) -> &'static str {
	match ty {
		gl::DEBUG_TYPE_ERROR => "error",
		gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "deprecated behavior",
		gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "undefined behavior",
		gl::DEBUG_TYPE_PORTABILITY => "portability",
		gl::DEBUG_TYPE_PERFORMANCE => "performance",
		gl::DEBUG_TYPE_MARKER => "marker",
		gl::DEBUG_TYPE_PUSH_GROUP => "push group",
		gl::DEBUG_TYPE_POP_GROUP => "pop group",
		_ => "other",
	}
}

extern "system" fn forward_message(
	source: GLenum,
	ty: GLenum,
	id: GLuint,
	severity: GLenum,
	length: GLsizei,
	message: *const c_char,
	_user_param: *mut c_void,
) {
	if message.is_null() {
		return
	}

	// a negative length means the message is null terminated
	let bytes = match usize::try_from(length) {
		Ok(length) => unsafe { slice::from_raw_parts(message as *const u8, length) },
		Err(_) => unsafe { CStr::from_ptr(message) }.to_bytes(),
	};

	log::log!(
		target: TARGET,
		severity_level(severity),
		"{} {} #{id}: {}",
		source_name(source),
		type_name(ty),
		String::from_utf8_lossy(bytes).trim_end(),
	);
}
