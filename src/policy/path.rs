//! Path resolution for workspace checks

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Symlinks followed before resolution gives up
const MAX_SYMLINK_HOPS: usize = 40;

/// Resolve a path to an absolute, symlink-free form
///
/// Works component by component: existing prefixes are canonicalized (which
/// follows symlinks), the non-existent tail is applied lexically. Dangling
/// symlinks are followed to their target even though it does not exist.
/// Relative paths are taken from the current working directory.
pub fn resolve(path: &Path) -> io::Result<PathBuf> {
    let mut hops = 0;
    resolve_following(path, &mut hops)
}

fn resolve_following(path: &Path, hops: &mut usize) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(part) => {
                resolved.push(part);
                if let Ok(canonical) = resolved.canonicalize() {
                    resolved = canonical;
                } else if is_symlink(&resolved) {
                    *hops += 1;
                    if *hops > MAX_SYMLINK_HOPS {
                        return Err(io::Error::other(format!(
                            "too many levels of symbolic links: {}",
                            path.display()
                        )));
                    }
                    let target = fs::read_link(&resolved)?;
                    resolved.pop();
                    // Relative targets are taken from the link's directory
                    resolved = resolve_following(&resolved.join(target), hops)?;
                }
            }
        }
    }

    Ok(resolved)
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
}
