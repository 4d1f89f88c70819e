use std::{
    fmt::Display,
    sync::{LazyLock, RwLock},
};

use nu_ansi_term::Color;

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));
pub static PROGRESS: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub fn progress_enabled() -> bool {
    *PROGRESS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn set_flag(flag: &RwLock<bool>, value: bool) {
    *flag.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = *COLOR.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        if color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}
