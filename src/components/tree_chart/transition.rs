//! Easing curves, timed transitions and tweens.

use serde::{Deserialize, Serialize};

use super::types::{Point, Size};

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

fn ease_in_out_cubic(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// Progress curve of a transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
	/// Constant speed.
	Linear,
	/// Fast start, slow finish.
	CubicOut,
	#[default]
	/// Slow start and finish.
	CubicInOut,
}

impl Easing {
	/// Maps linear progress in `[0, 1]` onto the eased curve.
	pub fn apply(self, t: f64) -> f64 {
		let t = t.clamp(0.0, 1.0);
		match self {
			Easing::Linear => t,
			Easing::CubicOut => ease_out_cubic(t),
			Easing::CubicInOut => ease_in_out_cubic(t),
		}
	}
}

/// Timing of one animation, in milliseconds on the chart clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
	/// Clock time the transition begins.
	pub start: f64,
	/// Length in milliseconds; zero or less snaps.
	pub duration: f64,
	/// Progress curve.
	pub easing: Easing,
}

impl Transition {
	/// A transition starting at `start`.
	pub fn new(start: f64, duration: f64, easing: Easing) -> Self {
		Self {
			start,
			duration,
			easing,
		}
	}

	/// Clock time the transition ends.
	pub fn end(&self) -> f64 {
		self.start + self.duration.max(0.0)
	}

	/// Eased progress at `now`, `1.0` once finished.
	pub fn progress(&self, now: f64) -> f64 {
		if self.duration <= 0.0 || now >= self.end() {
			return 1.0;
		}
		self.easing.apply((now - self.start) / self.duration)
	}

	/// Whether `now` is past the end.
	pub fn is_finished(&self, now: f64) -> bool {
		now >= self.end()
	}
}

/// Values a [`Tween`] can blend.
pub trait Interpolate: Copy {
	/// Linear blend towards `to`.
	fn lerp(self, to: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
	fn lerp(self, to: Self, t: f64) -> Self {
		self + (to - self) * t
	}
}

impl Interpolate for Point {
	fn lerp(self, to: Self, t: f64) -> Self {
		Point::new(self.x.lerp(to.x, t), self.y.lerp(to.y, t))
	}
}

impl Interpolate for Size {
	fn lerp(self, to: Self, t: f64) -> Self {
		Size::new(self.width.lerp(to.width, t), self.height.lerp(to.height, t))
	}
}

/// Start and end of an animated value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween<T> {
	/// Value at progress 0.
	pub from: T,
	/// Value at progress 1.
	pub to: T,
}

impl<T: Interpolate> Tween<T> {
	/// A tween from `from` to `to`.
	pub fn new(from: T, to: T) -> Self {
		Self { from, to }
	}

	/// A tween that stays at `value`.
	pub fn fixed(value: T) -> Self {
		Self::new(value, value)
	}

	/// Value at progress `t`.
	pub fn at(&self, t: f64) -> T {
		self.from.lerp(self.to, t)
	}

	/// Starts a new tween at the value reached at `t`, overriding the old target.
	pub fn retarget(&mut self, t: f64, to: T) {
		self.from = self.at(t);
		self.to = to;
	}
}
