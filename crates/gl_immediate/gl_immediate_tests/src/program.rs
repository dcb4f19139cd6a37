// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use std::ffi::c_char;

use gl::types::{GLenum, GLint, GLuint};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgramError {
	#[error("could not create shader object")]
	CouldNotCreate,
	#[error("could not compile shader - driver log:\n{0}\n")]
	Compile(String),
	#[error("could not link program - driver log:\n{0}\n")]
	Link(String),
}

/// Vertex + fragment program used by the test windows
pub struct Program {
	program_object: GLuint,
}

impl Program {
	/// # SAFETY
	/// * must be called from GL thread, with the context current
	pub unsafe fn new(vertex_source: &str, fragment_source: &str) -> Result<Self, ProgramError> {
		let vertex_shader = compile(gl::VERTEX_SHADER, vertex_source)?;
		let fragment_shader = match compile(gl::FRAGMENT_SHADER, fragment_source) {
			Ok(shader) => shader,
			Err(e) => {
				gl::DeleteShader(vertex_shader);
				return Err(e)
			},
		};

		let program = gl::CreateProgram();
		if program == 0 {
			gl::DeleteShader(vertex_shader);
			gl::DeleteShader(fragment_shader);
			return Err(ProgramError::CouldNotCreate)
		}

		gl::AttachShader(program, vertex_shader);
		gl::AttachShader(program, fragment_shader);
		gl::LinkProgram(program);

		// shaders are only kept alive by the program from here
		gl::DetachShader(program, vertex_shader);
		gl::DetachShader(program, fragment_shader);
		gl::DeleteShader(vertex_shader);
		gl::DeleteShader(fragment_shader);

		let mut link_status = 0;
		gl::GetProgramiv(program, gl::LINK_STATUS, &mut link_status);

		if link_status != gl::TRUE as GLint {
			let mut log_length = 0;
			gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut log_length);

			let mut log = vec![0u8; log_length.max(1) as usize];
			gl::GetProgramInfoLog(program, log_length, &mut log_length, log.as_mut_ptr() as *mut c_char);
			log.truncate(log_length.max(0) as usize);

			gl::DeleteProgram(program);
			return Err(ProgramError::Link(String::from_utf8_lossy(&log).into_owned()))
		}

		Ok(Self {
			program_object: program,
		})
	}

	pub fn bind(&self) {
		unsafe { gl::UseProgram(self.program_object) };
	}
}

impl Drop for Program {
	fn drop(&mut self) {
		unsafe { gl::DeleteProgram(self.program_object) };
	}
}

unsafe fn compile(ty: GLenum, source: &str) -> Result<GLuint, ProgramError> {
	let shader = gl::CreateShader(ty);
	if shader == 0 {
		return Err(ProgramError::CouldNotCreate)
	}

	let src_ptr = source.as_ptr() as *const c_char;
	let len = source.len() as GLint;
	gl::ShaderSource(shader, 1, &src_ptr, &len);
	gl::CompileShader(shader);

	let mut compile_status = 0;
	gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut compile_status);

	if compile_status != gl::TRUE as GLint {
		let mut log_length = 0;
		gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut log_length);

		let mut log = vec![0u8; log_length.max(1) as usize];
		gl::GetShaderInfoLog(shader, log_length, &mut log_length, log.as_mut_ptr() as *mut c_char);
		log.truncate(log_length.max(0) as usize);

		gl::DeleteShader(shader);
		return Err(ProgramError::Compile(String::from_utf8_lossy(&log).into_owned()))
	}

	Ok(shader)
}
