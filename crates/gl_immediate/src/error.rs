// Copyright (C) 2022 the ITK authors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/./

use thiserror::Error;

use crate::{
	draw::Topology,
	format::{Interpretation, StorageType},
};

/// Structural contract violations detected by the core.
///
/// None of these are transient. Fix the call sequence and retry
/// with a fresh session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImmediateError {
	#[error("invalid attribute descriptor: {0}")]
	InvalidDescriptor(DescriptorProblem),
	#[error("attribute index {0} is not part of the layout")]
	UnknownAttribute(u32),
	#[error(
		"attribute {index} expects {expected_count}x {expected_type:?}, got {got_count}x {got_type:?}"
	)]
	TypeMismatch {
		index: u32,
		expected_count: usize,
		expected_type: StorageType,
		got_count: usize,
		got_type: StorageType,
	},
	#[error("all {vertex_count} vertices have already been written")]
	TooManyAttributes { vertex_count: usize },
	#[error("incomplete vertex data: {written} of {expected} attribute values supplied")]
	IncompleteVertexData { written: usize, expected: usize },
	#[error("session was already finalized or cancelled")]
	AlreadyFinalized,
	#[error("span of {requested} bytes does not fit a {capacity} byte stream")]
	SpanTooLarge { requested: usize, capacity: usize },
	#[error("writer holds no vertices")]
	EmptyWriter,
	#[error("mesh has no variant named {0:?}")]
	UnknownVariant(String),
	#[error("{count} vertices cannot form {topology:?} primitives")]
	InvalidVertexCount { topology: Topology, count: usize },
	#[error("stream capacity must be greater than zero")]
	InvalidCapacity,
	#[error("session dropped without finalize or cancel")]
	UnclosedSession,
	#[error("indexed draw command given to a mesh without an index buffer")]
	MissingIndexBuffer,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorProblem {
	#[error("layout has no attributes")]
	Empty,
	#[error("attribute {index} has {count} components, expected 1 to 4")]
	ComponentCount { index: u32, count: usize },
	#[error("attribute {index} cannot interpret {storage:?} as {interpretation:?}")]
	Unsupported {
		index: u32,
		storage: StorageType,
		interpretation: Interpretation,
	},
	#[error("attribute index {0} appears more than once")]
	DuplicateIndex(u32),
}

pub type Result<T> = std::result::Result<T, ImmediateError>;
