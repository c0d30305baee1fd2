//! The VCS stage that runs before rule evaluation: either the set of files
//! tracked in the git index, or the `.gitignore` files found under the
//! scan root.

use crate::error::{AppError, Result};
use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const GIT_DIR_NAME: &str = ".git";
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnoreSettings {
    pub use_git: bool,
    pub use_gitignore: bool,
}

impl Default for IgnoreSettings {
    fn default() -> Self {
        Self {
            use_git: true,
            use_gitignore: true,
        }
    }
}

/// Paths tracked in the git index, relative to the scan root.
#[derive(Debug, Clone, Default)]
pub struct TrackedFiles {
    files: HashSet<String>,
    dirs: HashSet<String>,
}

impl TrackedFiles {
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut files = HashSet::new();
        let mut dirs = HashSet::new();
        for path in paths {
            let path = path.as_ref().trim_matches('/');
            if path.is_empty() {
                continue;
            }
            let mut ancestor = path;
            while let Some((parent, _)) = ancestor.rsplit_once('/') {
                if !dirs.insert(parent.to_string()) {
                    break;
                }
                ancestor = parent;
            }
            files.insert(path.to_string());
        }
        Self { files, dirs }
    }

    /// Reads the index of the repository enclosing `scan_root`. Returns
    /// `None` when there is no usable repository.
    pub fn discover(scan_root: &Path) -> Option<Self> {
        match Self::read_index(scan_root) {
            Ok(tracked) => {
                log::debug!(
                    "Loaded {} tracked files under {}",
                    tracked.len(),
                    scan_root.display()
                );
                Some(tracked)
            }
            Err(e) => {
                log::debug!("Not using git tracked files: {}", e);
                None
            }
        }
    }

    fn read_index(scan_root: &Path) -> Result<Self> {
        let repo = gix::discover(scan_root)
            .map_err(|e| AppError::Git(format!("Failed to discover git repository: {e}")))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| AppError::Git("Repository has no working directory".into()))?;

        let root_abs = scan_root.canonicalize()?;
        let workdir_abs = workdir.canonicalize()?;
        let prefix = pathdiff::diff_paths(&root_abs, &workdir_abs)
            .filter(|relative| !relative.starts_with(".."))
            .ok_or_else(|| {
                AppError::Git(format!(
                    "Scan root {} is outside the work tree {}",
                    root_abs.display(),
                    workdir_abs.display()
                ))
            })?
            .to_string_lossy()
            .replace('\\', "/");

        let index = repo
            .open_index()
            .map_err(|e| AppError::Git(format!("Failed to read git index: {e}")))?;

        let prefix_dir = format!("{prefix}/");
        let mut paths = Vec::new();
        for entry in index.entries() {
            let path = String::from_utf8_lossy(entry.path(&index));
            if prefix.is_empty() {
                paths.push(path.into_owned());
            } else if let Some(relative) = path.strip_prefix(&prefix_dir) {
                paths.push(relative.to_string());
            }
        }
        Ok(Self::from_paths(paths))
    }

    pub fn is_tracked(&self, relpath: &str, is_dir: bool) -> bool {
        if is_dir {
            self.dirs.contains(relpath)
        } else {
            self.files.contains(relpath)
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// One compiled `.gitignore` per directory that has one. The scan root
/// always has a spec, which also ignores `.git/`.
#[derive(Debug, Clone)]
pub struct GitignoreSpecs {
    root: PathBuf,
    specs: Vec<Gitignore>,
}

impl GitignoreSpecs {
    pub fn collect(scan_root: &Path) -> Self {
        let mut specs = Vec::new();
        push_spec(&mut specs, scan_root, true);

        // Ignored directories are pruned while looking for nested files.
        let walker = WalkBuilder::new(scan_root)
            .standard_filters(false)
            .hidden(false)
            .git_ignore(true)
            .require_git(false)
            .follow_links(false)
            .filter_entry(|entry| entry.file_name() != GIT_DIR_NAME)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                    if entry.depth() <= 1 || !is_file || entry.file_name() != GITIGNORE_FILE_NAME {
                        continue;
                    }
                    if let Some(dir) = entry.path().parent() {
                        push_spec(&mut specs, dir, false);
                    }
                }
                Err(e) => log::warn!("Error while collecting .gitignore files: {}", e),
            }
        }

        log::debug!(
            "Collected {} .gitignore specs under {}",
            specs.len(),
            scan_root.display()
        );
        Self {
            root: scan_root.to_path_buf(),
            specs,
        }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// True if any spec rooted at an ancestor of the path ignores it.
    pub fn is_ignored(&self, relpath: &str, is_dir: bool) -> bool {
        let path = self.root.join(relpath);
        self.specs
            .iter()
            .filter(|spec| path.starts_with(spec.path()) && path != spec.path())
            .any(|spec| spec.matched_path_or_any_parents(&path, is_dir).is_ignore())
    }
}

fn push_spec(specs: &mut Vec<Gitignore>, dir: &Path, ignore_git_dir: bool) {
    match build_spec(dir, ignore_git_dir) {
        Ok(Some(spec)) => specs.push(spec),
        Ok(None) => {}
        Err(e) => log::warn!("Could not compile ignore rules in {}: {}", dir.display(), e),
    }
}

fn build_spec(dir: &Path, ignore_git_dir: bool) -> Result<Option<Gitignore>> {
    let mut builder = GitignoreBuilder::new(dir);
    let file = dir.join(GITIGNORE_FILE_NAME);
    let has_file = file.is_file();
    if has_file {
        if let Some(e) = builder.add(&file) {
            log::warn!("Problem parsing {}: {}", file.display(), e);
        }
    }
    if ignore_git_dir {
        builder.add_line(None, &format!("{GIT_DIR_NAME}/"))?;
    }
    if !has_file && !ignore_git_dir {
        return Ok(None);
    }
    Ok(Some(builder.build()?))
}

/// Where the walker's first filtering stage comes from.
#[derive(Debug, Clone)]
pub enum IgnoreSource {
    Tracked(TrackedFiles),
    Gitignore(GitignoreSpecs),
    Disabled,
}

impl IgnoreSource {
    /// Tracked files win over `.gitignore` specs when both are allowed.
    pub fn detect(scan_root: &Path, settings: IgnoreSettings) -> Self {
        if settings.use_git {
            if let Some(tracked) = TrackedFiles::discover(scan_root) {
                log::info!("Filtering by {} git-tracked files", tracked.len());
                return IgnoreSource::Tracked(tracked);
            }
        }
        if settings.use_gitignore {
            let specs = GitignoreSpecs::collect(scan_root);
            log::info!("Filtering by {} .gitignore specs", specs.len());
            return IgnoreSource::Gitignore(specs);
        }
        log::info!("VCS filtering disabled");
        IgnoreSource::Disabled
    }

    /// Anything inside a `.git` directory is always ignored.
    pub fn is_ignored(&self, relpath: &str, is_dir: bool) -> bool {
        if relpath.split('/').any(|segment| segment == GIT_DIR_NAME) {
            return true;
        }
        match self {
            IgnoreSource::Tracked(tracked) => !tracked.is_tracked(relpath, is_dir),
            IgnoreSource::Gitignore(specs) => specs.is_ignored(relpath, is_dir),
            IgnoreSource::Disabled => false,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            IgnoreSource::Tracked(_) => "git index",
            IgnoreSource::Gitignore(_) => ".gitignore files",
            IgnoreSource::Disabled => "none",
        }
    }
}
