//! Wake trail left behind the ship.
//!
//! The trail records anchor points at the stern and ages them. Each frame the
//! renderer asks for a ribbon: a strip of quads that widens and fades as the
//! points get older.

use std::collections::VecDeque;

use bevy::math::{Vec2, Vec3};
use bevy::prelude::Resource;
use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct TrailConfig {
    /// Seconds a point survives
    pub lifetime: f32,
    /// Minimum distance between consecutive points (m)
    pub min_spacing: f32,
    pub max_points: usize,
    /// Ribbon width at the stern (m)
    pub start_width: f32,
    /// Ribbon width when a point expires (m)
    pub end_width: f32,
    /// Height of the ribbon above the anchor, avoids z-fighting with the sea
    pub lift: f32,
    /// Below this speed ratio no new points are laid down
    pub min_speed_ratio: f32,
    /// Linear RGBA of the foam
    pub color: [f32; 4],
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            lifetime: 4.0,
            min_spacing: 0.6,
            max_points: 256,
            start_width: 2.0,
            end_width: 7.0,
            lift: 0.05,
            min_speed_ratio: 0.03,
            color: [0.9, 0.95, 1.0, 0.7],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec3,
    pub age: f32,
    /// Ship speed ratio when the point was laid down
    pub intensity: f32,
}

/// Vertex data for the trail ribbon, laid out for a triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RibbonGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl RibbonGeometry {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct WaterTrail {
    pub config: TrailConfig,
    /// Oldest point first
    points: VecDeque<TrailPoint>,
}

impl WaterTrail {
    pub fn new(config: TrailConfig) -> Self {
        Self {
            points: VecDeque::with_capacity(config.max_points),
            config,
        }
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = &TrailPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Age the trail and, if the anchor moved far enough, record it.
    pub fn update(&mut self, anchor: Vec3, speed_ratio: f32, delta: f32) {
        let lifetime = self.config.lifetime;
        for point in self.points.iter_mut() {
            point.age += delta.max(0.0);
        }
        while self.points.front().is_some_and(|p| p.age >= lifetime) {
            self.points.pop_front();
        }

        if speed_ratio < self.config.min_speed_ratio {
            return;
        }

        let far_enough = self
            .points
            .back()
            .is_none_or(|p| p.position.distance_squared(anchor) >= self.config.min_spacing.powi(2));
        if !far_enough {
            return;
        }

        self.points.push_back(TrailPoint {
            position: anchor,
            age: 0.0,
            intensity: speed_ratio.clamp(0.0, 1.0),
        });
        while self.points.len() > self.config.max_points {
            self.points.pop_front();
        }
    }

    fn life_fraction(&self, age: f32) -> f32 {
        if self.config.lifetime <= 0.0 {
            return 1.0;
        }
        (age / self.config.lifetime).clamp(0.0, 1.0)
    }

    pub fn point_width(&self, age: f32) -> f32 {
        let t = self.life_fraction(age);
        self.config.start_width + (self.config.end_width - self.config.start_width) * t
    }

    pub fn point_alpha(&self, age: f32, intensity: f32) -> f32 {
        (1.0 - self.life_fraction(age)) * intensity
    }

    /// Build the ribbon mesh data. Needs at least two points.
    pub fn build_ribbon(&self) -> RibbonGeometry {
        let count = self.points.len();
        if count < 2 {
            return RibbonGeometry::default();
        }

        let mut geometry = RibbonGeometry {
            positions: Vec::with_capacity(count * 2),
            normals: Vec::with_capacity(count * 2),
            colors: Vec::with_capacity(count * 2),
            uvs: Vec::with_capacity(count * 2),
            indices: Vec::with_capacity((count - 1) * 6),
        };
        let [r, g, b, a] = self.config.color;

        for (i, point) in self.points.iter().enumerate() {
            // Direction of travel around this point, flattened onto the sea
            let prev = self.points[i.saturating_sub(1)].position;
            let next = self.points[(i + 1).min(count - 1)].position;
            let direction = Vec2::new(next.x - prev.x, next.z - prev.z).normalize_or(Vec2::Y);
            let side = Vec3::new(-direction.y, 0.0, direction.x);

            let half_width = self.point_width(point.age) / 2.0;
            let center = point.position + Vec3::Y * self.config.lift;
            let alpha = a * self.point_alpha(point.age, point.intensity);
            let v = i as f32 / (count - 1) as f32;

            for (offset, u) in [(-half_width, 0.0), (half_width, 1.0)] {
                geometry.positions.push((center + side * offset).to_array());
                geometry.normals.push([0.0, 1.0, 0.0]);
                geometry.colors.push([r, g, b, alpha]);
                geometry.uvs.push([u, v]);
            }
        }

        for i in 0..(count as u32 - 1) {
            let left = i * 2;
            let right = left + 1;
            let next_left = left + 2;
            let next_right = left + 3;
            geometry
                .indices
                .extend_from_slice(&[left, next_left, right, right, next_left, next_right]);
        }

        geometry
    }
}
