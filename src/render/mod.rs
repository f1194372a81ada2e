// SPDX-License-Identifier: GPL-3.0-only

//! Rendering: the fixed-size surface, the frame compositor, and the
//! cooperative frame loop that drives per-tick drawing.

pub mod compositor;
pub mod frame_loop;
pub mod surface;

pub use frame_loop::FrameLoop;
pub use surface::RenderSurface;
