// SPDX-License-Identifier: GPL-3.0-only

//! Output pipelines: still export and video assembly

pub mod photo;
pub mod video;
