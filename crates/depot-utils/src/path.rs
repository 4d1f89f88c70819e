use std::{env, path::PathBuf};

use crate::error::{PathError, PathResult};

/// Returns `$HOME`, falling back to `/home/$USER`.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| {
        let user = env::var("USER").unwrap_or_else(|_| "depot".to_string());
        PathBuf::from("/home").join(user)
    })
}

fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    match env::var_os(var) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir().join(fallback),
    }
}

/// Returns `$XDG_CONFIG_HOME`, defaulting to `$HOME/.config`.
pub fn xdg_config_home() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Returns `$XDG_DATA_HOME`, defaulting to `$HOME/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

fn lookup(var: &str, input: &str) -> PathResult<String> {
    let value = match var {
        "HOME" => home_dir(),
        "XDG_CONFIG_HOME" => xdg_config_home(),
        "XDG_DATA_HOME" => xdg_data_home(),
        _ => {
            return env::var(var).map_err(|_| {
                PathError::MissingEnvVar {
                    var: var.to_string(),
                    input: input.to_string(),
                }
            })
        }
    };
    Ok(value.to_string_lossy().into_owned())
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Expands `$VAR`, `${VAR}` and a leading `~`. A `$` not followed by a
/// variable name is kept as is.
fn expand_variables(input: &str) -> PathResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    if let Some(after) = rest.strip_prefix('~') {
        if after.is_empty() || after.starts_with('/') {
            out.push_str(&home_dir().to_string_lossy());
            rest = after;
        }
    }

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(braced) = tail.strip_prefix('{') {
            let end = braced.find('}').ok_or_else(|| {
                PathError::UnclosedVariable {
                    input: rest[pos..].to_string(),
                }
            })?;
            out.push_str(&lookup(&braced[..end], input)?);
            rest = &braced[end + 1..];
        } else {
            let len = tail.find(|c| !is_var_char(c)).unwrap_or(tail.len());
            if len == 0 {
                out.push('$');
            } else {
                out.push_str(&lookup(&tail[..len], input)?);
            }
            rest = &tail[len..];
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Resolves a configured path.
///
/// Expands environment variables and `~`, then makes relative paths absolute
/// against the current working directory.
///
/// # Errors
///
/// * [`PathError::Empty`] if the path is blank
/// * [`PathError::MissingEnvVar`] if a referenced variable is undefined
/// * [`PathError::UnclosedVariable`] for `${VAR` without the closing brace
/// * [`PathError::CurrentDir`] if the current directory cannot be determined
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let expanded = PathBuf::from(expand_variables(path)?);
    if expanded.is_absolute() {
        return Ok(expanded);
    }

    env::current_dir()
        .map(|cwd| cwd.join(expanded))
        .map_err(|source| PathError::CurrentDir { source })
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_expand_variables() {
        env::set_var("DEPOT_TEST_VAR", "srv");

        assert_eq!(expand_variables("/$DEPOT_TEST_VAR/depot").unwrap(), "/srv/depot");
        assert_eq!(
            expand_variables("/${DEPOT_TEST_VAR}/depot").unwrap(),
            "/srv/depot"
        );
        assert_eq!(expand_variables("path/$").unwrap(), "path/$");
        assert_eq!(expand_variables("a/~/b").unwrap(), "a/~/b");
        assert_eq!(expand_variables("~user/x").unwrap(), "~user/x");
        assert_eq!(expand_variables("${DEPOT_TEST_VAR}_x$").unwrap(), "srv_x$");

        env::remove_var("DEPOT_TEST_VAR");
    }

    #[test]
    #[serial]
    fn test_expand_variables_errors() {
        assert!(matches!(
            expand_variables("${DEPOT_TEST_VAR"),
            Err(PathError::UnclosedVariable { .. })
        ));
        assert!(matches!(
            expand_variables("$DEPOT_SURELY_MISSING_VAR/x"),
            Err(PathError::MissingEnvVar { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_xdg_directories() {
        env::set_var("HOME", "/tmp/home");
        env::remove_var("XDG_CONFIG_HOME");
        env::remove_var("XDG_DATA_HOME");

        assert_eq!(home_dir(), PathBuf::from("/tmp/home"));
        assert_eq!(xdg_config_home(), PathBuf::from("/tmp/home/.config"));
        assert_eq!(xdg_data_home(), PathBuf::from("/tmp/home/.local/share"));

        env::set_var("XDG_CONFIG_HOME", "/tmp/config");
        env::set_var("XDG_DATA_HOME", "/tmp/data");
        assert_eq!(xdg_config_home(), PathBuf::from("/tmp/config"));
        assert_eq!(xdg_data_home(), PathBuf::from("/tmp/data"));

        env::remove_var("XDG_CONFIG_HOME");
        env::remove_var("XDG_DATA_HOME");
    }

    #[test]
    #[serial]
    fn test_resolve_path() {
        env::set_var("HOME", "/tmp/home");

        assert!(matches!(resolve_path("  "), Err(PathError::Empty)));
        assert_eq!(resolve_path("/srv/depot").unwrap(), PathBuf::from("/srv/depot"));
        assert_eq!(
            resolve_path("relative/db").unwrap(),
            env::current_dir().unwrap().join("relative/db")
        );
        assert_eq!(resolve_path("~/depot").unwrap(), PathBuf::from("/tmp/home/depot"));
        assert_eq!(
            resolve_path("$HOME/depot").unwrap(),
            PathBuf::from("/tmp/home/depot")
        );
    }
}
