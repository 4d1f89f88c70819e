use std::env;

/// Sets environment variables for the lifetime of the guard and restores
/// the previous values on drop. Tests using it must be `#[serial]`.
pub struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn set(vars: &[(&str, &str)]) -> Self {
        let saved = vars
            .iter()
            .map(|(key, value)| {
                let previous = env::var(key).ok();
                env::set_var(key, value);
                (key.to_string(), previous)
            })
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            match previous {
                Some(value) => env::set_var(&key, value),
                None => env::remove_var(&key),
            }
        }
    }
}
