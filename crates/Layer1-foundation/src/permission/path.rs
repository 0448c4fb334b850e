//! Path resolution helpers
//!
//! 존재하지 않는 경로도 절대 경로로 변환하면서, 경로의 모든 컴포넌트에서
//! 심볼릭 링크를 해석합니다.

use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// `~` 확장
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// 심볼릭 링크 추적 한도
pub const MAX_SYMLINK_FOLLOWS: usize = 40;

/// 절대 경로 + 심볼릭 링크 해석 (realpath 방식)
///
/// 컴포넌트를 하나씩 붙이면서 링크면 대상으로 치환합니다. 마지막 컴포넌트가
/// 끊어진 링크여도 대상 경로로 해석되고, `..`는 앞 컴포넌트가 해석된 뒤에
/// 적용됩니다. 존재하지 않는 컴포넌트는 그대로 붙입니다.
pub fn resolve(target: &Path) -> Result<PathBuf> {
    let expanded = expand_home(target);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };

    let mut resolved = PathBuf::new();
    let mut pending: Vec<OsString> = Vec::new();
    push_components(&absolute, &mut resolved, &mut pending);

    let mut follows = 0;
    while let Some(part) = pending.pop() {
        if part == ".." {
            resolved.pop();
            continue;
        }

        let candidate = resolved.join(&part);
        let is_link = std::fs::symlink_metadata(&candidate)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        if !is_link {
            resolved = candidate;
            continue;
        }

        follows += 1;
        if follows > MAX_SYMLINK_FOLLOWS {
            return Err(Error::InvalidInput(format!(
                "Too many levels of symbolic links: {}",
                target.display()
            )));
        }
        let link = std::fs::read_link(&candidate)?;
        if link.is_absolute() {
            resolved = PathBuf::new();
        }
        push_components(&link, &mut resolved, &mut pending);
    }

    Ok(resolved)
}

/// 루트/접두부는 `resolved`에, 나머지는 역순으로 `pending`에
fn push_components(path: &Path, resolved: &mut PathBuf, pending: &mut Vec<OsString>) {
    let mut rest = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => rest.push(OsString::from("..")),
            Component::Normal(name) => rest.push(name.to_os_string()),
        }
    }
    pending.extend(rest.into_iter().rev());
}

/// 심볼릭 링크 자체인지 (링크를 따라가지 않음)
pub fn is_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// 경로 정규화 (canonicalize 없이)
pub fn normalize(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                // ".." 이면 마지막 컴포넌트 제거 (루트가 아닌 경우)
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            Component::CurDir => {}
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// 대소문자 무시 접두 비교 (컴포넌트 단위)
pub fn starts_with_ignore_case(path: &Path, prefix: &Path) -> bool {
    let path = path.to_string_lossy().to_lowercase();
    let prefix = prefix.to_string_lossy().to_lowercase();
    Path::new(&path).starts_with(Path::new(&prefix))
}
