/// Which local property of a node a track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackProperty {
    Translation,
    Rotation,
    Scaling,
}

impl TrackProperty {
    pub fn from_fbx(property: &str) -> Option<Self> {
        match property {
            "Lcl Translation" => Some(TrackProperty::Translation),
            "Lcl Rotation" => Some(TrackProperty::Rotation),
            "Lcl Scaling" => Some(TrackProperty::Scaling),
            _ => None,
        }
    }
}

/// One scalar keyframe channel. Times are seconds from clip start, ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curve {
    pub times: Vec<f32>,
    pub values: Vec<f32>,
}

impl Curve {
    pub fn new(times: Vec<f32>, values: Vec<f32>) -> Self {
        Self { times, values }
    }

    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Linear interpolation, clamped to the first and last key.
    pub fn sample(&self, time: f32) -> Option<f32> {
        let len = self.times.len().min(self.values.len());
        if len == 0 {
            return None;
        }

        let after = self.times[..len].partition_point(|&t| t <= time);
        if after == 0 {
            return Some(self.values[0]);
        }
        if after == len {
            return Some(self.values[len - 1]);
        }

        let (t0, t1) = (self.times[after - 1], self.times[after]);
        let (v0, v1) = (self.values[after - 1], self.values[after]);
        if t1 <= t0 {
            return Some(v0);
        }
        let t = (time - t0) / (t1 - t0);
        Some(v0 + (v1 - v0) * t)
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub node: usize,
    pub property: TrackProperty,
    /// X, Y, Z channels. A missing channel keeps the node's bind value.
    pub channels: [Option<Curve>; 3],
}

/// A named skeletal animation sequence bundled with a model.
#[derive(Debug, Clone)]
pub struct Clip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl Clip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            tracks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_interpolates_between_keys() {
        let curve = Curve::new(vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 30.0]);
        assert_eq!(curve.sample(0.5), Some(5.0));
        assert_eq!(curve.sample(1.5), Some(20.0));
        assert_eq!(curve.sample(1.0), Some(10.0));
    }

    #[test]
    fn curve_clamps_outside_range() {
        let curve = Curve::new(vec![0.5, 1.0], vec![2.0, 4.0]);
        assert_eq!(curve.sample(0.0), Some(2.0));
        assert_eq!(curve.sample(9.0), Some(4.0));
        assert_eq!(Curve::default().sample(0.0), None);
    }
}
