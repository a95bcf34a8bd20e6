// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region transforms — strip delete with reflow, area fill, and the
// fast-marching inpainting primitive both fill and text deletion build on.
//
// Every transform is total: bad geometry yields an unmodified copy.

pub mod fill;
pub mod inpaint;
pub mod strip;

pub use fill::fill;
pub use inpaint::{INPAINT_RADIUS, inpaint, inpaint_rects};
pub use strip::strip_delete;
