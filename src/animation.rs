//! # 背景动画
//!
//! 页面背景漂浮的爱心粒子。纯装饰，只保证视觉上与原页面一致：
//! 每帧积分位置与旋转，越界时按固定步长把速度往回拉，
//! 距离过近的两颗爱心沿连线方向互相弹开。

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEART_COUNT: usize = 13;
pub const VELOCITY_SCALE: f64 = 0.05;
pub const ROTATION_SCALE: f64 = 0.01;
/// 越界后每帧的速度修正量
pub const BOUNDARY_DAMPING: f64 = 0.001;
/// 小于该距离视为碰撞
pub const COLLISION_DISTANCE: f64 = 1.0;

const WIDTH_PER_ASPECT: f64 = 15.0;
const MAX_Y: f64 = 20.0;
const MAX_Z: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    fn scale(self, factor: f64) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// 零向量保持为零
    fn normalize(self) -> Vec3 {
        let length = self.length();
        if length == 0.0 {
            self
        } else {
            self.scale(1.0 / length)
        }
    }
}

/// 可见区域的半宽/半高/半深
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl Bounds {
    pub fn for_aspect(aspect: f64) -> Self {
        Self {
            max_x: aspect * WIDTH_PER_ASPECT,
            max_y: MAX_Y,
            max_z: MAX_Z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heart {
    pub position: Vec3,
    pub velocity: Vec3,
    /// 绕 x、y 轴的累计旋转
    pub rotation: (f64, f64),
    pub rotation_speed: (f64, f64),
}

impl Heart {
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.rotation.0.is_finite()
            && self.rotation.1.is_finite()
            && self.rotation_speed.0.is_finite()
            && self.rotation_speed.1.is_finite()
    }

    fn random(bounds: &Bounds, rng: &mut impl Rng) -> Self {
        let mut symmetric = |scale: f64| (rng.gen::<f64>() * 2.0 - 1.0) * scale;

        let position = Vec3::new(
            symmetric(bounds.max_x),
            symmetric(bounds.max_y),
            symmetric(bounds.max_z),
        );
        let velocity = Vec3::new(
            symmetric(VELOCITY_SCALE),
            symmetric(VELOCITY_SCALE),
            symmetric(VELOCITY_SCALE),
        );
        let rotation_speed = (symmetric(ROTATION_SCALE), symmetric(ROTATION_SCALE));

        Self {
            position,
            velocity,
            rotation: (0.0, 0.0),
            rotation_speed,
        }
    }

    fn integrate(&mut self) {
        self.rotation.0 += self.rotation_speed.0;
        self.rotation.1 += self.rotation_speed.1;

        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;
        self.position.z += self.velocity.z;
    }

    fn steer_back(&mut self, bounds: &Bounds) {
        self.velocity.x = steer_axis(self.position.x, self.velocity.x, bounds.max_x);
        self.velocity.y = steer_axis(self.position.y, self.velocity.y, bounds.max_y);
        self.velocity.z = steer_axis(self.position.z, self.velocity.z, bounds.max_z);
    }
}

fn steer_axis(position: f64, velocity: f64, max: f64) -> f64 {
    let mut velocity = velocity;
    if position > max {
        velocity = (velocity - BOUNDARY_DAMPING).max(-VELOCITY_SCALE);
    }
    if position < -max {
        velocity = (velocity + BOUNDARY_DAMPING).min(VELOCITY_SCALE);
    }
    velocity
}

/// 某一帧中单颗爱心的位姿
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeartPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rx: f64,
    pub ry: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub tick: u64,
    pub hearts: Vec<HeartPose>,
}

/// 爱心粒子场
#[derive(Debug, Clone, Serialize)]
pub struct HeartField {
    bounds: Bounds,
    hearts: Vec<Heart>,
}

impl HeartField {
    pub fn new(aspect: f64, count: usize, rng: &mut impl Rng) -> Self {
        let bounds = Bounds::for_aspect(aspect);
        let hearts = (0..count).map(|_| Heart::random(&bounds, &mut *rng)).collect();
        Self { bounds, hearts }
    }

    pub fn with_hearts(bounds: Bounds, hearts: Vec<Heart>) -> Self {
        Self { bounds, hearts }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn hearts(&self) -> &[Heart] {
        &self.hearts
    }

    /// 视口尺寸变化后只更新边界，不重置粒子
    pub fn resize(&mut self, aspect: f64) {
        self.bounds = Bounds::for_aspect(aspect);
    }

    pub fn snapshot(&self, tick: u64) -> Frame {
        Frame {
            tick,
            hearts: self
                .hearts
                .iter()
                .map(|h| HeartPose {
                    x: h.position.x,
                    y: h.position.y,
                    z: h.position.z,
                    rx: h.rotation.0,
                    ry: h.rotation.1,
                })
                .collect(),
        }
    }

    /// 连续推进 `ticks` 帧，返回每帧推进后的快照
    pub fn frames(&mut self, ticks: u64) -> Vec<Frame> {
        self.frames_from(0, ticks)
    }

    /// 从第 `start` 帧之后继续推进，帧号为 `start + 1 ..= start + ticks`
    pub fn frames_from(&mut self, start: u64, ticks: u64) -> Vec<Frame> {
        (1..=ticks)
            .map(|offset| {
                self.tick();
                self.snapshot(start + offset)
            })
            .collect()
    }

    /// 推进一帧
    ///
    /// 按顺序更新：第 i 颗先积分、修正边界，再与其后的每一颗做碰撞检测，
    /// 因此后面的粒子在检测时仍是上一帧的位置。
    pub fn tick(&mut self) {
        let impulse = VELOCITY_SCALE * 0.5;

        for i in 0..self.hearts.len() {
            self.hearts[i].integrate();
            let bounds = self.bounds;
            self.hearts[i].steer_back(&bounds);

            let (head, tail) = self.hearts.split_at_mut(i + 1);
            let current = &mut head[i];
            for other in tail.iter_mut() {
                let separation = current.position.sub(other.position);
                if separation.length() < COLLISION_DISTANCE {
                    let normal = separation.normalize().scale(impulse);

                    current.velocity.x += normal.x;
                    current.velocity.y += normal.y;
                    current.velocity.z += normal.z;

                    other.velocity.x -= normal.x;
                    other.velocity.y -= normal.y;
                    other.velocity.z -= normal.z;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn heart(position: Vec3, velocity: Vec3) -> Heart {
        Heart {
            position,
            velocity,
            rotation: (0.0, 0.0),
            rotation_speed: (0.01, -0.01),
        }
    }

    #[test]
    fn test_initial_state_within_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let field = HeartField::new(16.0 / 9.0, DEFAULT_HEART_COUNT, &mut rng);
        let bounds = field.bounds();

        assert_eq!(field.hearts().len(), 13);
        assert!((bounds.max_x - 16.0 / 9.0 * 15.0).abs() < 1e-9);
        for heart in field.hearts() {
            assert!(heart.position.x.abs() <= bounds.max_x);
            assert!(heart.position.y.abs() <= bounds.max_y);
            assert!(heart.position.z.abs() <= bounds.max_z);
            assert!(heart.velocity.length() <= VELOCITY_SCALE * 3f64.sqrt());
            assert!(heart.rotation_speed.0.abs() <= ROTATION_SCALE);
        }
    }

    #[test]
    fn test_tick_integrates_rotation_and_position() {
        let bounds = Bounds::for_aspect(1.0);
        let mut field = HeartField::with_hearts(
            bounds,
            vec![heart(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.01, -0.02, 0.03))],
        );
        field.tick();

        let h = &field.hearts()[0];
        assert!((h.position.x - 0.01).abs() < 1e-12);
        assert!((h.position.y + 0.02).abs() < 1e-12);
        assert!((h.position.z - 0.03).abs() < 1e-12);
        assert!((h.rotation.0 - 0.01).abs() < 1e-12);
        assert!((h.rotation.1 + 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_bounds_velocity_is_damped_and_clamped() {
        let bounds = Bounds::for_aspect(1.0);
        let mut field = HeartField::with_hearts(
            bounds,
            vec![heart(Vec3::new(20.0, 0.0, 0.0), Vec3::new(-0.0495, 0.0, 0.0))],
        );
        field.tick();
        // -0.0495 - 0.001 被截断到 -0.05
        assert!((field.hearts()[0].velocity.x + VELOCITY_SCALE).abs() < 1e-12);

        let mut field = HeartField::with_hearts(
            bounds,
            vec![heart(Vec3::new(0.0, -25.0, 0.0), Vec3::new(0.0, 0.01, 0.0))],
        );
        field.tick();
        assert!((field.hearts()[0].velocity.y - 0.011).abs() < 1e-12);
    }

    #[test]
    fn test_collision_pushes_pair_apart() {
        let bounds = Bounds::for_aspect(1.0);
        let mut field = HeartField::with_hearts(
            bounds,
            vec![
                heart(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0)),
                heart(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0)),
            ],
        );
        field.tick();

        let impulse = VELOCITY_SCALE * 0.5;
        assert!((field.hearts()[0].velocity.x - impulse).abs() < 1e-12);
        assert!((field.hearts()[1].velocity.x + impulse).abs() < 1e-12);
        assert_eq!(field.hearts()[0].velocity.y, 0.0);
    }

    #[test]
    fn test_coincident_hearts_do_not_produce_nan() {
        let bounds = Bounds::for_aspect(1.0);
        let mut field = HeartField::with_hearts(
            bounds,
            vec![
                heart(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 0.0, 0.0)),
                heart(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 0.0, 0.0)),
            ],
        );
        field.tick();
        for h in field.hearts() {
            assert!(h.velocity.x.is_finite() && h.position.x.is_finite());
        }
    }

    #[test]
    fn test_single_heart_overshoot_is_bounded() {
        // 最大速度下越界后需要 2*scale/damping 帧才能反向，
        // 期间最多越过 scale^2/(2*damping) 加上一帧的位移
        let overshoot = VELOCITY_SCALE * VELOCITY_SCALE / (2.0 * BOUNDARY_DAMPING)
            + 2.0 * VELOCITY_SCALE;

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            let mut field = HeartField::new(1.5, 1, &mut rng);
            let bounds = field.bounds();
            for _ in 0..20_000 {
                field.tick();
                let p = field.hearts()[0].position;
                assert!(p.x.abs() <= bounds.max_x + overshoot);
                assert!(p.y.abs() <= bounds.max_y + overshoot);
                assert!(p.z.abs() <= bounds.max_z + overshoot);
            }
        }
    }

    #[test]
    fn test_frames_follow_ticks() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut field = HeartField::new(1.0, 3, &mut rng);
        let mut replay = field.clone();

        let frames = field.frames(5);
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0].tick, 1);
        assert_eq!(frames[4].hearts.len(), 3);

        for _ in 0..5 {
            replay.tick();
        }
        assert_eq!(replay.snapshot(5), frames[4]);
        assert_eq!(field.frames(0).len(), 0);
    }

    #[test]
    fn test_frames_from_continues_numbering() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut whole = HeartField::new(1.0, 4, &mut rng);
        let mut split = whole.clone();

        let all = whole.frames(6);
        let mut joined = split.frames(3);
        joined.extend(split.frames_from(3, 3));
        assert_eq!(joined, all);
        assert_eq!(joined[5].tick, 6);
    }

    #[test]
    fn test_resize_updates_bounds_only() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = HeartField::new(1.0, 4, &mut rng);
        let before = field.hearts().to_vec();
        field.resize(2.0);
        assert!((field.bounds().max_x - 30.0).abs() < 1e-12);
        assert_eq!(field.hearts(), before.as_slice());
    }
}
