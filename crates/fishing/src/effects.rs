//! Fire-and-forget visual effect requests and HUD messages.
//!
//! The core never draws anything. It queues effect requests with a position,
//! colour and lifetime; the presentation layer reads the live list each frame
//! and renders them however it likes.

use std::time::Duration;

use engine_core::Vec2;

/// What to draw. Geometry beyond the anchor position lives in the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    MuzzleFlash,
    HitSparks { count: u32 },
    ScoreText { amount: u64 },
    Combo { combo: u32, bonus: u64 },
    AreaRing { radius: f32 },
    ChainLink { to: Vec2, depth: u32 },
    /// Full-screen flash for a long chain.
    ChainFlourish { length: usize },
    LightningBolt { to: Vec2 },
    Explosion { radius: f32 },
    FreezeWave,
    BombBlast { radius: f32 },
    LaserCharge,
    LaserBeam { half_width: f32 },
    NetCast { radius: f32 },
    BossWarning,
    JackpotBurst { amount: u64 },
    InsufficientFunds,
}

impl EffectKind {
    /// Default on-screen time.
    pub fn lifetime(&self) -> Duration {
        let millis = match self {
            EffectKind::MuzzleFlash => 100,
            EffectKind::HitSparks { .. } => 400,
            EffectKind::ScoreText { .. } => 1_000,
            EffectKind::Combo { .. } => 1_200,
            EffectKind::AreaRing { .. } => 500,
            EffectKind::ChainLink { .. } => 600,
            EffectKind::ChainFlourish { .. } => 800,
            EffectKind::LightningBolt { .. } => 300,
            EffectKind::Explosion { .. } => 700,
            EffectKind::FreezeWave => 1_000,
            EffectKind::BombBlast { .. } => 900,
            EffectKind::LaserCharge => 1_000,
            EffectKind::LaserBeam { .. } => 600,
            EffectKind::NetCast { .. } => 800,
            EffectKind::BossWarning => 2_500,
            EffectKind::JackpotBurst { .. } => 3_000,
            EffectKind::InsufficientFunds => 1_500,
        };
        Duration::from_millis(millis)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualEffect {
    pub kind: EffectKind,
    pub position: Vec2,
    pub color: [f32; 4],
    pub elapsed: Duration,
    /// Not shown until `elapsed` passes this.
    pub delay: Duration,
    pub lifetime: Duration,
}

impl VisualEffect {
    pub fn is_visible(&self) -> bool {
        self.elapsed >= self.delay
    }

    /// 0.0 when it appears, 1.0 when it is done.
    pub fn progress(&self) -> f32 {
        if self.lifetime.is_zero() {
            return 1.0;
        }
        let shown = self.elapsed.saturating_sub(self.delay);
        (shown.as_secs_f32() / self.lifetime.as_secs_f32()).min(1.0)
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.delay + self.lifetime
    }
}

/// Bounded list of live effects with one updater for every kind.
#[derive(Debug, Clone)]
pub struct EffectQueue {
    effects: Vec<VisualEffect>,
    capacity: usize,
}

impl Default for EffectQueue {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EffectQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            effects: Vec::new(),
            capacity,
        }
    }

    pub fn push(&mut self, kind: EffectKind, position: Vec2, color: [f32; 4]) {
        self.push_delayed(kind, position, color, Duration::ZERO);
    }

    pub fn push_delayed(&mut self, kind: EffectKind, position: Vec2, color: [f32; 4], delay: Duration) {
        let lifetime = kind.lifetime();
        self.effects.push(VisualEffect {
            kind,
            position,
            color,
            elapsed: Duration::ZERO,
            delay,
            lifetime,
        });
        if self.effects.len() > self.capacity {
            let overflow = self.effects.len() - self.capacity;
            self.effects.drain(..overflow);
        }
    }

    pub fn update(&mut self, dt: Duration) {
        for effect in &mut self.effects {
            effect.elapsed += dt;
        }
        self.effects.retain(|e| !e.is_finished());
    }

    /// Effects that should be on screen right now.
    pub fn visible(&self) -> impl Iterator<Item = &VisualEffect> {
        self.effects.iter().filter(|e| e.is_visible())
    }

    pub fn all(&self) -> &[VisualEffect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const GOLD: [f32; 4] = [1.0, 0.84, 0.0, 1.0];
pub const ICE: [f32; 4] = [0.53, 0.81, 0.92, 1.0];
pub const ELECTRIC: [f32; 4] = [0.6, 0.8, 1.0, 1.0];
pub const FIRE: [f32; 4] = [1.0, 0.27, 0.0, 1.0];
pub const ALERT: [f32; 4] = [1.0, 0.2, 0.2, 1.0];

/// A line of HUD text.
#[derive(Debug, Clone, PartialEq)]
pub struct GameMessage {
    pub text: String,
    pub color: [f32; 4],
    pub time_remaining: Duration,
}

#[derive(Debug, Clone)]
pub struct GameMessages {
    pub messages: Vec<GameMessage>,
    pub max_visible: usize,
    default_duration: Duration,
}

impl Default for GameMessages {
    fn default() -> Self {
        Self::new()
    }
}

impl GameMessages {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            max_visible: 6,
            default_duration: Duration::from_secs(3),
        }
    }

    pub fn push(&mut self, text: impl Into<String>, color: [f32; 4]) {
        self.messages.push(GameMessage {
            text: text.into(),
            color,
            time_remaining: self.default_duration,
        });
        if self.messages.len() > 20 {
            self.messages.remove(0);
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(text, [1.0, 1.0, 1.0, 1.0]);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(text, [0.3, 1.0, 0.3, 1.0]);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(text, [1.0, 0.9, 0.3, 1.0]);
    }

    pub fn update(&mut self, dt: Duration) {
        for msg in &mut self.messages {
            msg.time_remaining = msg.time_remaining.saturating_sub(dt);
        }
        self.messages.retain(|m| !m.time_remaining.is_zero());
    }

    /// Newest messages, up to `max_visible`.
    pub fn visible(&self) -> &[GameMessage] {
        let start = self.messages.len().saturating_sub(self.max_visible);
        &self.messages[start..]
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
