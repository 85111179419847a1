//! Global setting keys understood by the plugin.

use crate::overrides::ResolvedValue;

/// A setting name with the type and fallback used when no config supplies it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingKey {
    pub name: &'static str,
    pub default: ResolvedValue,
}

/// A setting with a statically typed fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setting<T> {
    pub name: &'static str,
    pub default: T,
}

impl Setting<bool> {
    pub const fn key(self) -> SettingKey {
        SettingKey {
            name: self.name,
            default: ResolvedValue::Bool(self.default),
        }
    }
}

impl Setting<i32> {
    pub const fn key(self) -> SettingKey {
        SettingKey {
            name: self.name,
            default: ResolvedValue::Int(self.default),
        }
    }
}

impl Setting<f64> {
    pub const fn key(self) -> SettingKey {
        SettingKey {
            name: self.name,
            default: ResolvedValue::Double(self.default),
        }
    }
}

/// Stop villagers from trading.
pub const DISABLE_TRADING: Setting<bool> = Setting {
    name: "DisableTrading",
    default: false,
};

/// Highest Hero of the Village level whose discount applies.
pub const MAX_HERO_LEVEL: Setting<i32> = Setting {
    name: "MaxHeroLevel",
    default: 1,
};

/// Largest discount as a fraction of the base price; negative leaves it alone.
pub const MAX_DISCOUNT: Setting<f64> = Setting {
    name: "MaxDiscount",
    default: 0.3,
};

/// Largest demand value; negative leaves it alone.
pub const MAX_DEMAND: Setting<i32> = Setting {
    name: "MaxDemand",
    default: -1,
};

pub const ALL: &[SettingKey] = &[
    DISABLE_TRADING.key(),
    MAX_HERO_LEVEL.key(),
    MAX_DISCOUNT.key(),
    MAX_DEMAND.key(),
];

/// Find a known setting by name, ignoring ASCII case.
pub fn lookup(name: &str) -> Option<SettingKey> {
    ALL.iter()
        .find(|key| key.name.eq_ignore_ascii_case(name))
        .copied()
}
