use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Boost,
    Shield,
    Ghost,
}

impl Effect {
    pub const ALL: [Effect; 3] = [Effect::Boost, Effect::Shield, Effect::Ghost];

    pub fn duration_ms(self) -> i64 {
        match self {
            Effect::Boost => 3000,
            Effect::Shield => 5000,
            Effect::Ghost => 4000,
        }
    }

    /// Share of all spawned food that carries this effect.
    pub fn spawn_chance(self) -> f64 {
        match self {
            Effect::Boost => 0.08,
            Effect::Shield => 0.04,
            Effect::Ghost => 0.03,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Effect::Boost => "#00BCD4",
            Effect::Shield => "#2196F3",
            Effect::Ghost => "#607D8B",
        }
    }

    pub fn activation_message(self) -> &'static str {
        match self {
            Effect::Boost => "Speed Boost Activated!",
            Effect::Shield => "Shield Activated!",
            Effect::Ghost => "Ghost Mode Activated!",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Effect::Boost => 1 << 0,
            Effect::Shield => 1 << 1,
            Effect::Ghost => 1 << 2,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Effect::Boost => 0,
            Effect::Shield => 1,
            Effect::Ghost => 2,
        }
    }
}

/// Active timed modifiers on a player.
///
/// Travels on the wire as `{ "boost": bool, "shield": bool, "ghost": bool }`; missing keys read as
/// inactive so an empty object is a valid empty set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "EffectFlags", into = "EffectFlags")]
pub struct EffectSet(u8);

impl EffectSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, effect: Effect) -> bool {
        self.0 & effect.bit() != 0
    }

    pub fn insert(&mut self, effect: Effect) {
        self.0 |= effect.bit();
    }

    /// Returns whether the effect was active.
    pub fn remove(&mut self, effect: Effect) -> bool {
        let was_active = self.contains(effect);
        self.0 &= !effect.bit();
        was_active
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct EffectFlags {
    #[serde(default)]
    boost: bool,
    #[serde(default)]
    shield: bool,
    #[serde(default)]
    ghost: bool,
}

impl From<EffectFlags> for EffectSet {
    fn from(flags: EffectFlags) -> Self {
        let mut set = EffectSet::empty();
        if flags.boost {
            set.insert(Effect::Boost);
        }
        if flags.shield {
            set.insert(Effect::Shield);
        }
        if flags.ghost {
            set.insert(Effect::Ghost);
        }
        set
    }
}

impl From<EffectSet> for EffectFlags {
    fn from(set: EffectSet) -> Self {
        Self {
            boost: set.contains(Effect::Boost),
            shield: set.contains(Effect::Shield),
            ghost: set.contains(Effect::Ghost),
        }
    }
}
