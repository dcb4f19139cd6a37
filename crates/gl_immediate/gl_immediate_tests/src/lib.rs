// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use glfw::{Context, OpenGlProfileHint, WindowHint};

pub mod debug;
pub mod program;

/// Shaders shared by the test windows: a vec4 position at
/// location 0 and a normalized color at location 1
pub const VERTEX_SHADER: &str = r#"#version 330 core
layout(location = 0) in vec4 position;
layout(location = 1) in vec4 color;

out vec4 vertex_color;

void main() {
	gl_Position = position;
	vertex_color = color;
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 330 core
in vec4 vertex_color;
out vec4 frag_color;

void main() {
	frag_color = vertex_color;
}
"#;

/// Open a window with a 3.3 core debug context and run the loop
/// returned by `test` once per frame until it is closed
pub fn view_window<I: FnOnce() -> L, L: FnMut()>(vsync: bool, test: I) {
	env_logger::init();

	let mut glfw = match glfw::init(glfw::FAIL_ON_ERRORS) {
		Ok(glfw) => glfw,
		Err(e) => {
			log::error!("could not initialize glfw: {e:?}");
			return
		},
	};
	glfw.window_hint(WindowHint::ContextVersion(3, 3));
	glfw.window_hint(WindowHint::OpenGlProfile(OpenGlProfileHint::Core));
	glfw.window_hint(WindowHint::OpenGlDebugContext(true));

	let Some((mut window, events)) =
		glfw.create_window(1000, 1000, "gl_immediate", glfw::WindowMode::Windowed)
	else {
		log::error!("could not create window");
		return
	};

	window.make_current();

	if !vsync {
		glfw.set_swap_interval(glfw::SwapInterval::None);
	}

	window.set_size_polling(true);

	gl::load_with(|p| window.get_proc_address(p));

	debug::setup_gl_debug();

	let mut test_loop = test();
	while !window.should_close() {
		test_loop();

		window.swap_buffers();
		glfw.poll_events();
		for (_, event) in glfw::flush_messages(&events) {
			match event {
				glfw::WindowEvent::Size(width, height) => unsafe {
					gl::Viewport(0, 0, width, height);
				},
				_ => {},
			}
		}
	}
}
